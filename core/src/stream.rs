//! Blocking stream primitive: open a URI with a context, then read it.
//!
//! # Design
//! `open` picks a wrapper from the URI scheme. The HTTP wrapper performs one
//! blocking exchange per hop with a fresh ureq agent and follows redirects
//! itself so that every status line and header line it sees lands in
//! `StreamMetaData::wrapper_data`, in arrival order. The file wrapper reads a
//! local path and reports no header lines.
//!
//! Options are keyed by scheme in a `StreamContext`; a wrapper only looks at
//! the options registered under the scheme it was opened with.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use ureq::http::header::LOCATION;
use ureq::http::{Response, StatusCode, Version};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};
use url::Url;

use crate::http::HttpMethod;

/// Redirect hops followed before the open fails.
pub const MAX_REDIRECTS: usize = 20;

/// Option set for one scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    pub method: HttpMethod,
    /// Keep the stream readable when the final status is 4xx/5xx.
    pub ignore_errors: bool,
    pub content: Option<String>,
    /// `Name: Value` lines, each terminated by CRLF.
    pub header: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            ignore_errors: false,
            content: None,
            header: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamContext {
    options: HashMap<String, StreamOptions>,
}

impl StreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, scheme: &str, options: StreamOptions) -> Self {
        self.options.insert(scheme.to_ascii_lowercase(), options);
        self
    }

    pub fn options(&self, scheme: &str) -> Option<&StreamOptions> {
        self.options.get(scheme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperType {
    Http,
    PlainFile,
}

impl WrapperType {
    pub fn as_str(self) -> &'static str {
        match self {
            WrapperType::Http => "http",
            WrapperType::PlainFile => "plainfile",
        }
    }

    pub fn is_http(self) -> bool {
        matches!(self, WrapperType::Http)
    }
}

/// What the wrapper observed while opening the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetaData {
    pub wrapper_type: WrapperType,
    /// Header lines across every hop, in arrival order. Each hop starts with a
    /// status line rebuilt as `<version> <code> <reason>` from the parsed
    /// response, using the canonical reason phrase (`Unknown` when the code
    /// has none), not the reason text the server sent.
    pub wrapper_data: Vec<String>,
    /// URI the body was finally read from.
    pub uri: String,
    pub redirect_count: usize,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unable to open {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("unable to find the wrapper \"{scheme}\" to open {uri}")]
    UnsupportedScheme { uri: String, scheme: String },

    #[error("{0}")]
    Http(#[from] ureq::Error),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("redirection limit of {limit} reached at {uri}")]
    TooManyRedirects { uri: String, limit: usize },

    #[error("HTTP request failed! {status_line}")]
    HttpStatus { status_line: String },
}

/// An open stream. Dropping it releases the underlying handle.
pub struct Stream {
    reader: Box<dyn Read>,
    meta: StreamMetaData,
}

impl Stream {
    pub fn meta_data(&self) -> &StreamMetaData {
        &self.meta
    }

    /// Read everything that is left. Invalid UTF-8 is replaced.
    pub fn read_to_string(&mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn into_meta_data(self) -> StreamMetaData {
        self.meta
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// The scheme of `uri`, lower-cased, if it parses as an absolute URI.
pub fn scheme_of(uri: &str) -> Option<String> {
    Url::parse(uri).ok().map(|url| url.scheme().to_string())
}

pub fn open(uri: &str, context: &StreamContext) -> Result<Stream, StreamError> {
    let url = Url::parse(uri).map_err(|e| StreamError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {
            let options = context.options(url.scheme()).cloned().unwrap_or_default();
            open_http(url, options)
        }
        "file" => open_file(url),
        scheme => Err(StreamError::UnsupportedScheme {
            uri: uri.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

fn open_file(url: Url) -> Result<Stream, StreamError> {
    let path = url.to_file_path().map_err(|()| StreamError::InvalidUri {
        uri: url.to_string(),
        reason: "not a local file path".to_string(),
    })?;
    let file = File::open(&path)?;
    Ok(Stream {
        reader: Box::new(file),
        meta: StreamMetaData {
            wrapper_type: WrapperType::PlainFile,
            wrapper_data: Vec::new(),
            uri: url.to_string(),
            redirect_count: 0,
        },
    })
}

fn open_http(mut url: Url, options: StreamOptions) -> Result<Stream, StreamError> {
    let agent: Agent = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .timeout_global(options.timeout)
        .build()
        .new_agent();
    let headers = header_lines(options.header.as_deref());
    let mut method = options.method;
    let mut content = options.content;
    let mut wrapper_data = Vec::new();
    let mut redirect_count = 0;

    loop {
        let response = send(&agent, method, url.as_str(), &headers, content.as_deref())?;
        let status = response.status();
        wrapper_data.push(status_line(response.version(), status));
        for (name, value) in response.headers() {
            wrapper_data.push(format!(
                "{}: {}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            ));
        }

        let location = if status.is_redirection() {
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        } else {
            None
        };

        let Some(location) = location else {
            if !options.ignore_errors && status.as_u16() >= 400 {
                return Err(StreamError::HttpStatus {
                    status_line: status_line(response.version(), status),
                });
            }
            return Ok(Stream {
                reader: Box::new(response.into_body().into_reader()),
                meta: StreamMetaData {
                    wrapper_type: WrapperType::Http,
                    wrapper_data,
                    uri: url.to_string(),
                    redirect_count,
                },
            });
        };

        if redirect_count == MAX_REDIRECTS {
            return Err(StreamError::TooManyRedirects {
                uri: url.to_string(),
                limit: MAX_REDIRECTS,
            });
        }
        let next = url.join(&location).map_err(|e| StreamError::InvalidUri {
            uri: location.clone(),
            reason: e.to_string(),
        })?;
        debug!(from = %url, to = %next, status = status.as_u16(), "following redirect");

        // Only 307/308 replay the original method and body.
        if !matches!(status.as_u16(), 307 | 308) {
            if method != HttpMethod::Head {
                method = HttpMethod::Get;
            }
            content = None;
        }
        url = next;
        redirect_count += 1;
    }
}

fn send(
    agent: &Agent,
    method: HttpMethod,
    uri: &str,
    headers: &[(String, String)],
    content: Option<&str>,
) -> Result<Response<Body>, ureq::Error> {
    let body = content.map(str::as_bytes);
    match method {
        HttpMethod::Get => without_body(with_headers(agent.get(uri), headers), body),
        HttpMethod::Delete => without_body(with_headers(agent.delete(uri), headers), body),
        HttpMethod::Head => with_headers(agent.head(uri), headers).call(),
        HttpMethod::Post => with_body(with_headers(agent.post(uri), headers), body),
        HttpMethod::Put => with_body(with_headers(agent.put(uri), headers), body),
    }
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    body: Option<&[u8]>,
) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.force_send_body().send(bytes),
        None => builder.call(),
    }
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    body: Option<&[u8]>,
) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// `HTTP/1.1 404 Not Found`. The reason is the canonical phrase for the code.
fn status_line(version: Version, status: StatusCode) -> String {
    format!(
        "{:?} {} {}",
        version,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

/// Split a CRLF header block back into name/value pairs.
fn header_lines(block: Option<&str>) -> Vec<(String, String)> {
    block
        .unwrap_or_default()
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

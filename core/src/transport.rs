//! Stream-backed transport for the search client.
//!
//! # Design
//! `StreamTransport` holds only the connection config and the scheme it
//! composes URIs with; it carries no mutable state between calls. `execute`
//! is split the same way every step is testable on its own:
//! `build_uri` and `build_options` produce plain data without touching the
//! network, the stream primitive performs the single blocking exchange, and
//! `parse_response` turns the body plus wrapper metadata into a classified
//! `Response`.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::{ConnectionConfig, TransportParams};
use crate::error::TransportError;
use crate::http::{HttpMethod, Request, RequestBody};
use crate::response::Response;
use crate::status::resolve_status;
use crate::stream::{self, StreamContext, StreamMetaData, StreamOptions};

/// A pluggable way of turning a `Request` into a `Response`.
pub trait Transport {
    fn execute(&self, request: &Request, params: &TransportParams)
        -> Result<Response, TransportError>;
}

#[derive(Debug, Clone)]
pub struct StreamTransport {
    connection: ConnectionConfig,
    scheme: String,
}

impl StreamTransport {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            scheme: "http".to_string(),
        }
    }

    /// Same transport, composing `https://` URIs.
    pub fn https(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            scheme: "https".to_string(),
        }
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Explicit URL verbatim, otherwise `scheme://host:port[/prefix]`.
    pub fn base_uri(&self) -> String {
        if let Some(url) = self.connection.url() {
            return url.to_string();
        }
        let base = format!(
            "{}://{}:{}",
            self.scheme, self.connection.host, self.connection.port
        );
        match self.connection.path() {
            Some(prefix) => join_path(&base, prefix.trim_end_matches('/')),
            None => base,
        }
    }

    /// Full target URI for `request`, query string included.
    pub fn build_uri(&self, request: &Request) -> String {
        let mut uri = join_path(&self.base_uri(), &request.path);
        if !request.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&request.query)
                .finish();
            uri.push('?');
            uri.push_str(&query);
        }
        uri
    }

    /// Option set handed to the stream wrapper for this request.
    pub fn build_options(
        &self,
        request: &Request,
        params: &TransportParams,
    ) -> Result<StreamOptions, TransportError> {
        let mut options = StreamOptions {
            method: request.method,
            ignore_errors: true,
            ..StreamOptions::default()
        };

        if params.post_with_request_body && request.method != HttpMethod::Head {
            options.content = encode_body(&request.data)?;
        }

        let header = header_block(&self.connection);
        if !header.is_empty() {
            options.header = Some(header);
        }
        options.timeout = self.connection.timeout();
        Ok(options)
    }

    /// Resolve the status from the wrapper metadata and classify the reply.
    ///
    /// An error status or `error` field is a `ResponseError`. A reply in which
    /// every shard failed is also a `ResponseError`: it is neither a partial
    /// result nor a success. Some-but-not-all failed shards give a
    /// `PartialFailure`.
    pub fn parse_response(
        &self,
        request: &Request,
        body: String,
        query_time: Duration,
        meta: StreamMetaData,
    ) -> Result<Response, TransportError> {
        let status = if meta.wrapper_type.is_http() {
            resolve_status(meta.wrapper_data.iter().map(String::as_str))
        } else {
            0
        };
        let response = Response::new(body, status)
            .with_query_time(query_time)
            .with_transfer_info(meta);

        if response.has_error() || response.all_shards_failed() {
            return Err(TransportError::response_error(request, response));
        }
        if response.has_failed_shards() {
            warn!(path = %request.path, "partial shard failure");
            return Err(TransportError::partial_failure(request, response));
        }
        Ok(response)
    }
}

impl Transport for StreamTransport {
    fn execute(
        &self,
        request: &Request,
        params: &TransportParams,
    ) -> Result<Response, TransportError> {
        let uri = self.build_uri(request);
        let scheme = stream::scheme_of(&uri).unwrap_or_default();
        let options = self.build_options(request, params)?;
        let method = options.method;
        let context = StreamContext::new().with_options(&scheme, options);

        let start = Instant::now();
        let mut handle = stream::open(&uri, &context).map_err(|e| open_failed(&uri, e))?;
        let body = handle.read_to_string().map_err(|e| open_failed(&uri, e))?;
        let query_time = start.elapsed();
        let meta = handle.into_meta_data();

        let result = self.parse_response(request, body, query_time, meta);
        debug!(
            %method,
            %uri,
            status = result
                .as_ref()
                .map_or_else(|e| e.response().map_or(0, Response::status), Response::status),
            elapsed_ms = query_time.as_millis() as u64,
            "request executed"
        );
        result
    }
}

fn open_failed(uri: &str, err: impl std::fmt::Display) -> TransportError {
    let message = err.to_string();
    warn!(%uri, error = %message, "unable to open stream");
    if message.is_empty() {
        TransportError::OpenFailed(format!("unable to open {uri}"))
    } else {
        TransportError::OpenFailed(message)
    }
}

/// Join two URI pieces with exactly one `/` between them.
fn join_path(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// `Name: Value\r\n` for every configured header.
fn header_block(connection: &ConnectionConfig) -> String {
    connection
        .headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}\r\n"))
        .collect()
}

/// Wire text for a request body, or `None` when there is nothing to send.
fn encode_body(data: &RequestBody) -> Result<Option<String>, TransportError> {
    if data.is_empty() {
        return Ok(None);
    }
    let content = match data {
        RequestBody::Json(value) => serde_json::to_string(value)
            .map_err(|e| TransportError::Serialization(e.to_string()))?,
        RequestBody::Text(text) => text.clone(),
        RequestBody::None => return Ok(None),
    };
    Ok(Some(content.replace("\\/", "/")))
}

//! Outgoing request types handed to a `Transport`.
//!
//! # Design
//! A `Request` describes what the search client wants to send as plain data:
//! method, path relative to the connection's base URI, ordered query pairs and
//! an optional body. The transport decides how (and whether) each part reaches
//! the wire. All fields use owned types so a request can be attached to an
//! error and handed back to the caller.

use std::fmt;

use serde_json::Value;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload. Structured data is encoded by the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    None,
    Text(String),
    Json(Value),
}

impl RequestBody {
    /// True when there is nothing worth sending. `Text("0")` is content.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::None => true,
            RequestBody::Text(text) => text.is_empty(),
            RequestBody::Json(Value::Null) => true,
            RequestBody::Json(Value::String(s)) => s.is_empty(),
            RequestBody::Json(Value::Array(items)) => items.is_empty(),
            RequestBody::Json(Value::Object(map)) => map.is_empty(),
            RequestBody::Json(_) => false,
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// A search-client request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub data: RequestBody,
}

impl Request {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            data: RequestBody::None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_data(mut self, data: impl Into<RequestBody>) -> Self {
        self.data = data.into();
        self
    }
}

//! Error types returned by `Transport::execute`.
//!
//! # Design
//! The three failure kinds are kept apart so callers can pick a retry policy
//! per kind: `OpenFailed` never reached a usable reply, `ResponseError` got an
//! error reply, and `PartialFailure` got a reply in which only some shards
//! answered. The latter two carry the request and the full response.

use thiserror::Error;

use crate::http::Request;
use crate::response::Response;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The stream could not be opened or read.
    #[error("{0}")]
    OpenFailed(String),

    /// The node answered with an error status or an error payload.
    #[error("{} {} failed with status {}{}", .request.method, .request.path, .response.status(), detail(.response))]
    ResponseError {
        request: Box<Request>,
        response: Box<Response>,
    },

    /// The node answered, but some of the shards failed.
    #[error("{} {} succeeded on {} of {} shards", .request.method, .request.path, shards_ok(.response), shards_total(.response))]
    PartialFailure {
        request: Box<Request>,
        response: Box<Response>,
    },

    /// The request body could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    pub fn response_error(request: &Request, response: Response) -> Self {
        TransportError::ResponseError {
            request: Box::new(request.clone()),
            response: Box::new(response),
        }
    }

    pub fn partial_failure(request: &Request, response: Response) -> Self {
        TransportError::PartialFailure {
            request: Box::new(request.clone()),
            response: Box::new(response),
        }
    }

    pub fn request(&self) -> Option<&Request> {
        match self {
            TransportError::ResponseError { request, .. }
            | TransportError::PartialFailure { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            TransportError::ResponseError { response, .. }
            | TransportError::PartialFailure { response, .. } => Some(response),
            _ => None,
        }
    }
}

fn detail(response: &Response) -> String {
    response
        .error_message()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

fn shards_ok(response: &Response) -> u64 {
    response
        .shards_statistics()
        .map_or(0, |stats| stats.successful)
}

fn shards_total(response: &Response) -> u64 {
    response.shards_statistics().map_or(0, |stats| stats.total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_error_message_includes_reason() {
        let request = Request::get("/error");
        let response = Response::new(r#"{"error": "test"}"#.to_string(), 500);
        let err = TransportError::response_error(&request, response);
        assert_eq!(err.to_string(), "GET /error failed with status 500: test");
        assert_eq!(err.request(), Some(&request));
        assert_eq!(err.response().map(Response::status), Some(500));
    }

    #[test]
    fn partial_failure_message_counts_shards() {
        let request = Request::get("/shards_fail");
        let body = r#"{"_shards": {"total": 5, "successful": 4, "failed": 1}}"#;
        let err = TransportError::partial_failure(&request, Response::new(body.to_string(), 200));
        assert_eq!(err.to_string(), "GET /shards_fail succeeded on 4 of 5 shards");
    }

    #[test]
    fn open_failure_has_no_attachments() {
        let err = TransportError::OpenFailed("unable to open foo://bar".to_string());
        assert!(err.request().is_none());
        assert!(err.response().is_none());
        assert_eq!(err.to_string(), "unable to open foo://bar");
    }
}

//! Blocking stream transport for a document-search client.
//!
//! # Overview
//! Turns a search-client `Request` into one blocking HTTP exchange over a
//! stream primitive and adapts the raw reply (status lines, headers, body)
//! into a normalized `Response`, or a typed `TransportError`.
//!
//! # Design
//! - `StreamTransport` is stateless apart from its `ConnectionConfig`; every
//!   call rebuilds its URI and options.
//! - URI/option building, the blocking exchange and response parsing are
//!   separate steps so the first and last can be tested without I/O.
//! - The stream primitive records every header line it sees, including the
//!   status lines of redirect hops; the transport reports the first
//!   non-redirect status among them.

pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod status;
pub mod stream;
pub mod transport;

pub use config::{ConnectionConfig, TransportParams};
pub use error::TransportError;
pub use http::{HttpMethod, Request, RequestBody};
pub use response::{Response, ShardStats};
pub use stream::{StreamMetaData, WrapperType};
pub use transport::{StreamTransport, Transport};

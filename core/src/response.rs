//! Normalized response returned by a transport.
//!
//! # Design
//! The body is parsed once at construction. Anything that is not a JSON
//! object is wrapped as `{"message": <body>}` so callers always see an object,
//! which is how plain-text replies such as `ok` reach the search client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::stream::StreamMetaData;

/// Shard counters a search node reports under `_shards`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShardStats {
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub failures: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    body: String,
    status: u16,
    data: Value,
    query_time: Duration,
    transfer_info: Option<StreamMetaData>,
}

impl Response {
    pub fn new(body: String, status: u16) -> Self {
        let data = match serde_json::from_str::<Value>(&body) {
            Ok(value @ Value::Object(_)) => value,
            _ => json!({ "message": body }),
        };
        Self {
            body,
            status,
            data,
            query_time: Duration::ZERO,
            transfer_info: None,
        }
    }

    pub fn with_query_time(mut self, query_time: Duration) -> Self {
        self.query_time = query_time;
        self
    }

    pub fn with_transfer_info(mut self, transfer_info: StreamMetaData) -> Self {
        self.transfer_info = Some(transfer_info);
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// HTTP status, or 0 when the stream carried no status line.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn query_time(&self) -> Duration {
        self.query_time
    }

    /// Stream metadata, absent until a transport attaches it.
    pub fn transfer_info(&self) -> Option<&StreamMetaData> {
        self.transfer_info.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error status, or a non-null top-level `error` field.
    pub fn has_error(&self) -> bool {
        self.status >= 400 || self.error().is_some()
    }

    fn error(&self) -> Option<&Value> {
        self.data.get("error").filter(|error| !error.is_null())
    }

    pub fn error_message(&self) -> Option<String> {
        let error = self.error()?;
        match error {
            Value::String(message) => Some(message.clone()),
            Value::Object(fields) => {
                let reason = fields.get("reason").and_then(Value::as_str);
                match (fields.get("type").and_then(Value::as_str), reason) {
                    (Some(kind), Some(reason)) => Some(format!("{kind}: {reason}")),
                    (None, Some(reason)) => Some(reason.to_string()),
                    _ => Some(error.to_string()),
                }
            }
            other => Some(other.to_string()),
        }
    }

    pub fn shards_statistics(&self) -> Option<ShardStats> {
        let shards = self.data.get("_shards")?;
        serde_json::from_value(shards.clone()).ok()
    }

    /// Some shards failed, but not all of them.
    pub fn has_failed_shards(&self) -> bool {
        self.shards_statistics()
            .is_some_and(|stats| stats.failed > 0 && stats.failed < stats.total)
    }

    pub fn all_shards_failed(&self) -> bool {
        self.shards_statistics()
            .is_some_and(|stats| stats.total > 0 && stats.failed >= stats.total)
    }
}

use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::Path,
    http::{header::LOCATION, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// What `/_echo` saw on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/_echo", any(echo))
        .route("/_echo/{*rest}", any(echo))
        .route("/index/type/test", get(hits))
        .route("/{index}/_search", get(search).post(search))
        .route("/foo/bar", get(ok))
        .route("/redirect", get(redirect_permanent))
        .route("/redirect/temporary", any(redirect_temporary))
        .route("/redirect/loop", get(redirect_loop))
        .route("/error", get(error))
        .route("/shards_fail", get(shards_fail))
        .route("/shards_down", get(shards_down))
        .route("/slow", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn hits() -> Json<Value> {
    Json(json!({"hits": {"total": 123}}))
}

async fn search(Path(index): Path<String>) -> Json<Value> {
    Json(json!({
        "took": 13,
        "timed_out": false,
        "_shards": {"total": 5, "successful": 5, "failed": 0},
        "hits": {
            "total": 1,
            "max_score": 1,
            "hits": [{
                "_index": index,
                "_id": "5458158",
                "_score": 1,
                "_source": {"id": 5458158, "title": "test blog"}
            }]
        }
    }))
}

async fn ok() -> &'static str {
    "ok"
}

async fn redirect_permanent() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(LOCATION, "/_echo/redirected")])
}

async fn redirect_temporary() -> impl IntoResponse {
    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, "/_echo/redirected")])
}

async fn redirect_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/redirect/loop")])
}

async fn error() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "test"})))
}

async fn shards_fail() -> Json<Value> {
    Json(json!({"_shards": {"total": 5, "successful": 4, "failed": 1}}))
}

async fn shards_down() -> Json<Value> {
    Json(json!({"_shards": {"total": 5, "successful": 0, "failed": 5}}))
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "ok"
}

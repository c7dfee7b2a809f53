use axum::http::{self, header::LOCATION, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, EchoedRequest};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_method_query_headers_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_echo/test?foo=1")
                .header("X-Time", "42")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(r#"{"foo":"bar"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "POST");
    assert_eq!(echoed.path, "/_echo/test");
    assert_eq!(echoed.query.as_deref(), Some("foo=1"));
    assert_eq!(echoed.headers.get("x-time").map(String::as_str), Some("42"));
    assert_eq!(echoed.body, r#"{"foo":"bar"}"#);
}

#[tokio::test]
async fn echo_accepts_bare_path() {
    let resp = app().oneshot(get("/_echo")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "GET");
    assert!(echoed.query.is_none());
}

// --- search surface ---

#[tokio::test]
async fn hits_total() {
    let resp = app().oneshot(get("/index/type/test")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = body_json(resp).await;
    assert_eq!(data["hits"]["total"], 123);
}

#[tokio::test]
async fn search_names_the_index() {
    let resp = app().oneshot(get("/blog/_search")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = body_json(resp).await;
    assert_eq!(data["hits"]["hits"][0]["_index"], "blog");
    assert_eq!(data["_shards"]["failed"], 0);
}

#[tokio::test]
async fn prefixed_path_is_plain_text() {
    let resp = app().oneshot(get("/foo/bar")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "ok");
}

// --- redirects ---

#[tokio::test]
async fn redirect_is_permanent() {
    let resp = app().oneshot(get("/redirect")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[LOCATION], "/_echo/redirected");
}

#[tokio::test]
async fn temporary_redirect_accepts_post() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/redirect/temporary")
                .body("payload".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn redirect_loop_points_at_itself() {
    let resp = app().oneshot(get("/redirect/loop")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[LOCATION], "/redirect/loop");
}

// --- failures ---

#[tokio::test]
async fn error_returns_500_with_error_field() {
    let resp = app().oneshot(get("/error")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let data: Value = body_json(resp).await;
    assert_eq!(data["error"], "test");
}

#[tokio::test]
async fn shards_fail_reports_one_failure() {
    let resp = app().oneshot(get("/shards_fail")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = body_json(resp).await;
    assert_eq!(data["_shards"]["total"], 5);
    assert_eq!(data["_shards"]["failed"], 1);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let resp = app().oneshot(get("/nothing/here/at/all")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

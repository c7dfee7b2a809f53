//! Verify URI composition and status resolution against JSON vectors stored
//! in `test-vectors/`.

use stream_transport::status::resolve_status;
use stream_transport::{ConnectionConfig, Request, StreamTransport};

// ---------------------------------------------------------------------------
// URI composition
// ---------------------------------------------------------------------------

#[test]
fn uri_test_vectors() {
    let raw = include_str!("../../test-vectors/uris.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let connection: ConnectionConfig =
            serde_json::from_value(case["connection"].clone()).unwrap();
        let mut request = Request::get(case["request_path"].as_str().unwrap());
        for pair in case["query"].as_array().unwrap() {
            let pair = pair.as_array().unwrap();
            request = request.with_query(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
        }

        let uri = StreamTransport::new(connection).build_uri(&request);
        assert_eq!(uri, case["expected_uri"].as_str().unwrap(), "{name}: uri");
    }
}

// ---------------------------------------------------------------------------
// Status resolution
// ---------------------------------------------------------------------------

#[test]
fn status_line_test_vectors() {
    let raw = include_str!("../../test-vectors/status_lines.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let lines: Vec<&str> = case["lines"]
            .as_array()
            .unwrap()
            .iter()
            .map(|line| line.as_str().unwrap())
            .collect();

        let status = resolve_status(lines.iter().copied());
        let expected = case["expected_status"].as_u64().unwrap() as u16;
        assert_eq!(status, expected, "{name}: status");
    }
}

//! Verify request builders against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs and the exact request the backend must
//! receive. Bodies are compared as parsed JSON so key order does not matter,
//! but every key must match: a field that should be omitted must be absent.

use cloud_client::{ChatCompletionRequest, ChatMessage, CloudClient, HttpMethod, HttpRequest, StorageMetaInput};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8088/api";

fn client() -> CloudClient {
    CloudClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Vector ids are numbers or strings; both are substituted as written.
fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => panic!("unsupported id: {other}"),
    }
}

fn request_body(req: &HttpRequest) -> Value {
    let text = req.body.as_ref().and_then(|b| b.as_json()).unwrap();
    serde_json::from_str(text).unwrap()
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => assert_eq!(&request_body(req), body, "{name}: body"),
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn add_meta_test_vectors() {
    let raw = include_str!("../../test-vectors/add_meta.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: StorageMetaInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_add_meta(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_meta_test_vectors() {
    let raw = include_str!("../../test-vectors/update_meta.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = id_text(&case["input_id"]);
        let input: StorageMetaInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_meta(&input, &id).unwrap();
        check_request(name, &req, &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_meta_test_vectors() {
    let raw = include_str!("../../test-vectors/delete_meta.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = id_text(&case["input_id"]);

        let req = c.build_delete_meta(&id);
        check_request(name, &req, &case["expected_request"]);
        assert!(req.headers.is_empty(), "{name}: headers");
    }
}

// ---------------------------------------------------------------------------
// Bearer
// ---------------------------------------------------------------------------

#[test]
fn bearer_test_vectors() {
    let raw = include_str!("../../test-vectors/bearer.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    let payload = ChatCompletionRequest::new("gpt-3.5-turbo", vec![ChatMessage::user("hi")]);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let key = case["api_key"].as_str().unwrap();
        let expected = case["expected_authorization"].as_str().unwrap();

        let requests = [
            c.build_get_balance(key),
            c.build_create_transcription(Default::default(), key),
            c.build_create_completion(&payload, key).unwrap(),
        ];
        for req in &requests {
            assert_eq!(req.header("authorization"), Some(expected), "{name}: {}", req.path);
        }
    }
}

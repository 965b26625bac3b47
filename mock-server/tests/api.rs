use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, CloudMeta, WebResult};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn with_bearer(mut req: Request<String>, key: &str) -> Request<String> {
    req.headers_mut().insert(
        http::header::AUTHORIZATION,
        format!("Bearer {key}").parse().unwrap(),
    );
    req
}

// --- support ---

#[tokio::test]
async fn cloud_types_are_listed() {
    let resp = app().oneshot(get("/api/support/cloud/types")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let result: WebResult<Vec<Value>> = body_json(resp).await;
    let types = result.data.unwrap();
    assert_eq!(types.len(), 5);
    assert_eq!(types[0]["id"], "1");
    assert_eq!(types[2]["name"], "本地磁盘");
    assert_eq!(types[3]["name"], "OneDrive");
}

// --- meta ---

#[tokio::test]
async fn list_meta_empty() {
    let resp = app().oneshot(get("/api/storage/meta")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let result: WebResult<Vec<CloudMeta>> = body_json(resp).await;
    assert_eq!(result.code, 0);
    assert!(result.data.unwrap().is_empty());
}

#[tokio::test]
async fn create_meta_returns_id() {
    let resp = app()
        .oneshot(json_request("POST", "/api/storage/meta", r#"{"name":"mydrive","cloud_type":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let result: WebResult<i32> = body_json(resp).await;
    assert_eq!(result.data, Some(1));
}

#[tokio::test]
async fn create_meta_with_string_cloud_type_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/storage/meta", r#"{"name":"x","cloud_type":"1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_meta_not_found() {
    let resp = app().oneshot(get("/api/storage/meta/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let result: WebResult<CloudMeta> = body_json(resp).await;
    assert_eq!(result.code, 404);
    assert!(result.data.is_none());
}

#[tokio::test]
async fn get_meta_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/storage/meta/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_meta_not_found() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/storage/meta/7")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn paths_outside_api_are_not_served() {
    let resp = app().oneshot(get("/storage/meta")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- bearer endpoints ---

#[tokio::test]
async fn credit_grants_requires_bearer() {
    let resp = app().oneshot(get("/api/dashboard/billing/credit_grants")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app()
        .oneshot(with_bearer(get("/api/dashboard/billing/credit_grants"), "sk-1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["total_available"], 17.5);
}

#[tokio::test]
async fn chat_completion_echoes_last_message() {
    let req = with_bearer(
        json_request(
            "POST",
            "/api/v1/chat/completions",
            r#"{"model":"gpt-3.5-turbo","messages":[{"role":"user","content":"ping"}]}"#,
        ),
        "sk-test",
    );
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["choices"][0]["message"]["content"], "echo: ping");
}

#[tokio::test]
async fn chat_completion_without_bearer_is_401() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/chat/completions", r#"{"messages":[]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn transcription_reads_file_part() {
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clip.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\n\
         abcd\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"model\"\r\n\r\n\
         whisper-1\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/audio/transcriptions")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(http::header::AUTHORIZATION, "Bearer sk-t")
        .body(body)
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["text"], "4 bytes from clip.wav");
    assert_eq!(body["model"], "whisper-1");
}

// --- full meta lifecycle ---

#[tokio::test]
async fn meta_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create local disk: starts enabled
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/storage/meta",
            r#"{"name":"disk","cloud_type":3,"data_root":"/data"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: WebResult<i32> = body_json(resp).await;
    let id = created.data.unwrap();

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/storage/meta/{id}")))
        .await
        .unwrap();
    let fetched: WebResult<CloudMeta> = body_json(resp).await;
    let fetched = fetched.data.unwrap();
    assert_eq!(fetched.name, "disk");
    assert_eq!(fetched.status, mock_server::STATUS_ENABLE);
    assert_eq!(fetched.auth.as_deref(), Some("{}"));

    // update: full replace of name/data_root/auth
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/storage/meta/{id}"),
            r#"{"name":"renamed","cloud_type":3,"auth":"{\"k\":1}"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: WebResult<CloudMeta> = body_json(resp).await;
    let updated = updated.data.unwrap();
    assert_eq!(updated.name, "renamed");
    assert!(updated.data_root.is_none());
    assert_eq!(updated.auth.as_deref(), Some(r#"{"k":1}"#));

    // disable
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", &format!("/api/storage/meta/{id}/disable"), ""))
        .await
        .unwrap();
    let disabled: WebResult<CloudMeta> = body_json(resp).await;
    assert_eq!(disabled.data.unwrap().status, mock_server::STATUS_DISABLED);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/storage/meta/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/storage/meta"))
        .await
        .unwrap();
    let listed: WebResult<Vec<CloudMeta>> = body_json(resp).await;
    assert!(listed.data.unwrap().is_empty());
}

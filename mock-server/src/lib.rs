use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tokio::{net::TcpListener, sync::RwLock};

pub const STATUS_WAIT_INIT: i8 = 0;
pub const STATUS_ENABLE: i8 = 2;
pub const STATUS_DISABLED: i8 = 4;

/// Backends listed by `/support/cloud/types`, keyed by wire code.
#[derive(Clone, Copy, Debug, EnumIter, IntoStaticStr)]
#[repr(i8)]
pub enum CloudType {
    #[strum(serialize = "阿里云盘")]
    AliYun = 1,
    #[strum(serialize = "百度云盘")]
    Baidu = 2,
    #[strum(serialize = "本地磁盘")]
    Local = 3,
    #[strum(serialize = "OneDrive")]
    OneDrive = 4,
    #[strum(serialize = "Sftp")]
    Sftp = 5,
}

/// Backend response wrapper; `code == 0` is success.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebResult<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> WebResult<T> {
    pub fn success(data: T) -> Self {
        WebResult {
            code: 0,
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn fail(code: i32, message: &str) -> Self {
        WebResult {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloudMeta {
    pub id: i32,
    pub name: String,
    pub cloud_type: i8,
    pub data_root: Option<String>,
    pub auth: Option<String>,
    pub status: i8,
}

#[derive(Deserialize)]
pub struct CloudMetaVo {
    pub name: String,
    pub cloud_type: i8,
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_id: i32,
    metas: BTreeMap<i32, CloudMeta>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply<T> = (StatusCode, Json<WebResult<T>>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/support/cloud/types", get(cloud_types))
        .route("/storage/meta", get(list_meta).post(create_meta))
        .route(
            "/storage/meta/{id}",
            get(get_meta).post(update_meta).delete(delete_meta),
        )
        .route("/storage/meta/{id}/enable", post(enable_meta))
        .route("/storage/meta/{id}/disable", post(disable_meta))
        .route("/dashboard/billing/credit_grants", get(credit_grants))
        .route("/v1/audio/transcriptions", post(transcriptions))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(db);

    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(WebResult::success(data)))
}

fn fail<T>(status: StatusCode, message: &str) -> Reply<T> {
    (status, Json(WebResult::fail(i32::from(status.as_u16()), message)))
}

fn not_found<T>(id: i32) -> Reply<T> {
    fail(StatusCode::NOT_FOUND, &format!("cloud meta {id} not found"))
}

async fn cloud_types() -> Reply<Vec<Value>> {
    let types = CloudType::iter()
        .map(|kind| {
            let name: &'static str = kind.into();
            json!({"id": (kind as i8).to_string(), "name": name})
        })
        .collect();
    ok(types)
}

async fn list_meta(State(db): State<Db>) -> Reply<Vec<CloudMeta>> {
    let store = db.read().await;
    ok(store.metas.values().cloned().collect())
}

async fn create_meta(State(db): State<Db>, Json(vo): Json<CloudMetaVo>) -> Reply<i32> {
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;

    // Local disks and sftp need no oauth step, so they start enabled.
    let status = match vo.cloud_type {
        3 | 5 => STATUS_ENABLE,
        _ => STATUS_WAIT_INIT,
    };

    tracing::info!(id, name = %vo.name, cloud_type = vo.cloud_type, "created cloud meta");
    store.metas.insert(
        id,
        CloudMeta {
            id,
            name: vo.name,
            cloud_type: vo.cloud_type,
            data_root: vo.data_root,
            auth: Some(vo.auth.unwrap_or_else(|| "{}".to_string())),
            status,
        },
    );
    ok(id)
}

async fn get_meta(State(db): State<Db>, Path(id): Path<i32>) -> Reply<CloudMeta> {
    let store = db.read().await;
    match store.metas.get(&id) {
        Some(meta) => ok(meta.clone()),
        None => not_found(id),
    }
}

async fn update_meta(
    State(db): State<Db>,
    Path(id): Path<i32>,
    Json(vo): Json<CloudMetaVo>,
) -> Reply<CloudMeta> {
    let mut store = db.write().await;
    let Some(meta) = store.metas.get_mut(&id) else {
        return not_found(id);
    };
    meta.name = vo.name;
    meta.data_root = vo.data_root;
    meta.auth = Some(vo.auth.unwrap_or_else(|| "{}".to_string()));
    ok(meta.clone())
}

async fn delete_meta(State(db): State<Db>, Path(id): Path<i32>) -> Reply<CloudMeta> {
    let mut store = db.write().await;
    match store.metas.remove(&id) {
        Some(meta) => ok(meta),
        None => not_found(id),
    }
}

async fn set_status(db: Db, id: i32, status: i8) -> Reply<CloudMeta> {
    let mut store = db.write().await;
    let Some(meta) = store.metas.get_mut(&id) else {
        return not_found(id);
    };
    meta.status = status;
    ok(meta.clone())
}

async fn enable_meta(State(db): State<Db>, Path(id): Path<i32>) -> Reply<CloudMeta> {
    set_status(db, id, STATUS_ENABLE).await
}

async fn disable_meta(State(db): State<Db>, Path(id): Path<i32>) -> Reply<CloudMeta> {
    set_status(db, id, STATUS_DISABLED).await
}

/// Key from `Authorization: Bearer <key>`, if present and non-empty.
pub fn bearer_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|key| !key.is_empty())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "missing bearer token", "type": "invalid_request_error"}})),
    )
}

async fn credit_grants(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer_key(&headers).is_none() {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "object": "credit_summary",
            "total_granted": 18.0,
            "total_used": 0.5,
            "total_available": 17.5,
        })),
    )
}

async fn transcriptions(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    if bearer_key(&headers).is_none() {
        return unauthorized();
    }

    let mut file: Option<(String, usize)> = None;
    let mut model: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"message": err.to_string()}})),
                )
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(bytes) = field.bytes().await else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"message": "unreadable form field"}})),
            );
        };
        match name.as_str() {
            "file" => file = Some((file_name.unwrap_or_default(), bytes.len())),
            "model" => model = Some(String::from_utf8_lossy(&bytes).into_owned()),
            _ => {}
        }
    }

    match file {
        Some((file_name, len)) => (
            StatusCode::OK,
            Json(json!({
                "text": format!("{len} bytes from {file_name}"),
                "model": model,
            })),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "file is required"}})),
        ),
    }
}

async fn chat_completions(headers: HeaderMap, Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    if bearer_key(&headers).is_none() {
        return unauthorized();
    }

    let last = payload["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string();

    (
        StatusCode::OK,
        Json(json!({
            "object": "chat.completion",
            "model": payload["model"],
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": format!("echo: {last}")},
                "finish_reason": "stop",
            }],
        })),
    )
}

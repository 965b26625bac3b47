//! Stateless HTTP request builder for the storage and assistant API.
//!
//! # Design
//! `CloudClient` holds only a `base_url` and carries no mutable state between
//! calls. Every backend operation has a `build_*` method producing an
//! `HttpRequest`; executing it is left to `Transport` (or any host that can
//! do HTTP). Credentials are parameters of the individual builders and are
//! never kept on the client.

use std::fmt;

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
use crate::types::StorageMetaInput;

pub const SUPPORT_CLOUD_TYPES: &str = "/support/cloud/types";
pub const STORAGE_META: &str = "/storage/meta";
pub const BILLING_CREDIT_GRANTS: &str = "/dashboard/billing/credit_grants";
pub const AUDIO_TRANSCRIPTIONS: &str = "/v1/audio/transcriptions";
pub const CHAT_COMPLETIONS: &str = "/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct CloudClient {
    base_url: String,
}

impl CloudClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_support_cloud(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, SUPPORT_CLOUD_TYPES.to_string())
    }

    pub fn build_get_all_meta(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, STORAGE_META.to_string())
    }

    pub fn build_get_meta(&self, id: impl fmt::Display) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{STORAGE_META}/{id}"))
    }

    pub fn build_add_meta(&self, meta: &StorageMetaInput) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, STORAGE_META.to_string(), &meta.to_body()?)
    }

    /// Full replace of storage `id`. The id is formatted as-is into the path.
    pub fn build_update_meta(
        &self,
        meta: &StorageMetaInput,
        id: impl fmt::Display,
    ) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, format!("{STORAGE_META}/{id}"), &meta.to_body()?)
    }

    pub fn build_delete_meta(&self, id: impl fmt::Display) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("{STORAGE_META}/{id}"))
    }

    pub fn build_enable_meta(&self, id: impl fmt::Display) -> HttpRequest {
        self.bare(HttpMethod::Post, format!("{STORAGE_META}/{id}/enable"))
    }

    pub fn build_disable_meta(&self, id: impl fmt::Display) -> HttpRequest {
        self.bare(HttpMethod::Post, format!("{STORAGE_META}/{id}/disable"))
    }

    pub fn build_get_balance(&self, api_key: &str) -> HttpRequest {
        let mut req = self.bare(HttpMethod::Get, BILLING_CREDIT_GRANTS.to_string());
        req.headers.push(bearer(api_key));
        req
    }

    pub fn build_create_transcription(&self, form: MultipartForm, api_key: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url(AUDIO_TRANSCRIPTIONS),
            headers: vec![bearer(api_key)],
            body: Some(RequestBody::Multipart(form)),
        }
    }

    /// Chat completion request. Any serializable payload is accepted; the
    /// streaming variant of the endpoint is not used.
    pub fn build_create_completion<T>(&self, data: &T, api_key: &str) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let mut req = self.json(HttpMethod::Post, CHAT_COMPLETIONS.to_string(), data)?;
        req.headers.push(bearer(api_key));
        Ok(req)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(&path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json<T>(&self, method: HttpMethod, path: String, body: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method,
            path: self.url(&path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(RequestBody::Json(body)),
        })
    }
}

fn bearer(api_key: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {api_key}"))
}

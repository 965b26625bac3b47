//! One async call per backend operation.
//!
//! `CloudApi` pairs the request builder with the transport. Every method
//! performs exactly one HTTP request and hands the response back untouched;
//! decoding the body is left to the caller (see `HttpResponse::json`).

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::client::CloudClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpResponse, MultipartForm};
use crate::transport::Transport;
use crate::types::StorageMetaInput;

static GLOBAL: OnceLock<CloudApi> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct CloudApi {
    client: CloudClient,
    transport: Transport,
}

impl CloudApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(CloudApi {
            client: CloudClient::new(&config.base_url),
            transport: Transport::new(config)?,
        })
    }

    /// Process-wide instance, configured from the environment on first use
    /// and kept for the life of the process.
    pub fn global() -> Result<&'static CloudApi, ConfigError> {
        if let Some(api) = GLOBAL.get() {
            return Ok(api);
        }

        let api = CloudApi::new(&ClientConfig::from_env()?)?;
        Ok(GLOBAL.get_or_init(|| api))
    }

    /// Install an explicit configuration as the process-wide instance. Returns
    /// the instance that ends up installed, which is the earlier one if
    /// `global` or `init_global` already ran.
    pub fn init_global(config: &ClientConfig) -> Result<&'static CloudApi, ConfigError> {
        let api = CloudApi::new(config)?;
        Ok(GLOBAL.get_or_init(|| api))
    }

    pub fn client(&self) -> &CloudClient {
        &self.client
    }

    pub async fn get_support_cloud(&self) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_get_support_cloud()).await
    }

    pub async fn get_all_meta(&self) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_get_all_meta()).await
    }

    pub async fn get_meta(&self, id: impl fmt::Display) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_get_meta(id)).await
    }

    pub async fn add_meta(&self, meta: &StorageMetaInput) -> Result<HttpResponse, ApiError> {
        let req = self.client.build_add_meta(meta)?;
        self.transport.execute(req).await
    }

    pub async fn update_meta(
        &self,
        meta: &StorageMetaInput,
        id: impl fmt::Display,
    ) -> Result<HttpResponse, ApiError> {
        let req = self.client.build_update_meta(meta, id)?;
        self.transport.execute(req).await
    }

    pub async fn delete_meta(&self, id: impl fmt::Display) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_delete_meta(id)).await
    }

    pub async fn enable_meta(&self, id: impl fmt::Display) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_enable_meta(id)).await
    }

    pub async fn disable_meta(&self, id: impl fmt::Display) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_disable_meta(id)).await
    }

    pub async fn get_balance(&self, api_key: &str) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.client.build_get_balance(api_key)).await
    }

    pub async fn create_transcription(
        &self,
        form: MultipartForm,
        api_key: &str,
    ) -> Result<HttpResponse, ApiError> {
        let req = self.client.build_create_transcription(form, api_key);
        self.transport.execute(req).await
    }

    pub async fn create_completion<T>(&self, data: &T, api_key: &str) -> Result<HttpResponse, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let req = self.client.build_create_completion(data, api_key)?;
        self.transport.execute(req).await
    }
}

//! Error types for the cloud API client.
//!
//! # Design
//! The client adds no translation layer: a non-2xx answer comes back as
//! `HttpError` with the raw status and body, and a network failure comes back
//! as the `reqwest::Error` that caused it. Presenting either to a user is the
//! caller's business.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 2xx.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Connection, timeout or protocol failure from the HTTP stack.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// A string `cloud_type` with no leading integer, or one too large for
    /// `i64`.
    #[error("cloud_type {0:?} is not an integer in range")]
    InvalidCloudType(String),

    /// A header value (usually the api key) contains bytes HTTP does not allow.
    #[error("invalid value for header {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be an absolute http(s) url: {value:?}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be host:port: {value:?}")]
    InvalidAddr { name: &'static str, value: String },

    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document rejected: {0}")]
    Rejected(String),

    #[error("document could not be encoded")]
    Encode(#[source] serde_json::Error),
}

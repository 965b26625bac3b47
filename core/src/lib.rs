//! API client core for the cloud storage service.
//!
//! # Overview
//! Talks to the storage backend (storage metadata CRUD, supported cloud
//! types) and the assistant endpoints it fronts (billing balance, speech to
//! text, chat completions). Also writes user profiles to a document store
//! and declares the route table for the hosting UI.
//!
//! # Design
//! - `CloudClient` is stateless and holds only `base_url`. Its `build_*`
//!   methods turn an operation into an `HttpRequest` value without I/O.
//! - `Transport` executes a request once over a shared `reqwest::Client`.
//! - `CloudApi` joins the two: one async method per backend operation,
//!   returning the raw `HttpResponse`.
//! - Credentials are per-call arguments; nothing is cached between calls.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod profile;
pub mod routes;
pub mod transport;
pub mod types;

pub use api::CloudApi;
pub use client::CloudClient;
pub use config::{ClientConfig, ProxyConfig};
pub use error::{ApiError, ConfigError, StoreError};
pub use http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use profile::{
    add_user_to_users_collection, AuthUser, DocumentStore, MemoryDocumentStore, ProfileDocument, UserProfile,
};
pub use routes::{cloud_routes, Route, RouteMeta, RouteTable, RouteTarget};
pub use transport::Transport;
pub use types::{
    ChatCompletionRequest, ChatMessage, ChatRole, CloudType, CloudTypeDescriptor, CloudTypeValue, Envelope,
    MetaStatus, StorageMeta, StorageMetaBody, StorageMetaInput,
};

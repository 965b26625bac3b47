//! User profile documents in the external document store.
//!
//! After sign-in the identity provider hands back a user; its display name
//! and photo are written to `users/{uid}`. The write replaces the whole
//! document. A failed write is logged and reported only through
//! `UserProfile::created`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;

pub const USERS_COLLECTION: &str = "users";

/// The slice of an identity-provider user the profile writer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Stored document body. The id lives in the document key, not the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Local summary of a profile write. `created` is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created: bool,
}

/// Keyed document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or fully replace the document `collection/id`.
    async fn set_document(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;
}

pub async fn add_user_to_users_collection(store: &dyn DocumentStore, user: &AuthUser) -> UserProfile {
    let mut profile = UserProfile {
        id: user.uid.clone(),
        name: user.display_name.clone(),
        avatar: user.photo_url.clone(),
        created: false,
    };

    let document = ProfileDocument {
        name: user.display_name.clone(),
        avatar: user.photo_url.clone(),
    };

    let result = match serde_json::to_value(&document) {
        Ok(value) => store.set_document(USERS_COLLECTION, &user.uid, value).await,
        Err(err) => Err(StoreError::Encode(err)),
    };

    match result {
        Ok(()) => profile.created = true,
        Err(err) => tracing::error!(uid = %user.uid, error = %err, "failed to write user profile"),
    }

    profile
}

/// In-process document store, keyed by `(collection, id)`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.documents
            .read()
            .await
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_document(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        if id.is_empty() || id.contains('/') {
            return Err(StoreError::Rejected(format!("invalid document id {id:?}")));
        }

        self.documents
            .write()
            .await
            .insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }
}

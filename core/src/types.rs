//! Domain DTOs for the storage and assistant API.
//!
//! # Design
//! Input types (`StorageMetaInput`) are what callers hand in; body types
//! (`StorageMetaBody`) are what actually goes over the wire. Keeping them
//! apart makes the field renaming and `auth` stringification explicit in one
//! conversion instead of hiding it in serde attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::ApiError;

/// Storage backends known to the server. The discriminant is the wire code
/// and the strum name is the label the server shows for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
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

impl CloudType {
    pub fn code(&self) -> i8 {
        *self as i8
    }

    pub fn from_code(code: i64) -> Option<Self> {
        CloudType::iter().find(|t| i64::from(t.code()) == code)
    }

    pub fn display_name(&self) -> &'static str {
        self.into()
    }
}

/// Entry of `GET /support/cloud/types`. The server sends the id as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudTypeDescriptor {
    pub id: String,
    pub name: String,
}

impl From<CloudType> for CloudTypeDescriptor {
    fn from(value: CloudType) -> Self {
        CloudTypeDescriptor {
            id: value.code().to_string(),
            name: value.display_name().to_string(),
        }
    }
}

/// A `cloud_type` as callers tend to have it: a number, or the string a form
/// field produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CloudTypeValue {
    Int(i64),
    Text(String),
}

impl CloudTypeValue {
    /// Resolve to the integer code. Strings follow leading-integer rules:
    /// surrounding whitespace and trailing non-digits are ignored, so `" 2"`
    /// and `"3abc"` are accepted while `"abc"` is not.
    pub fn to_code(&self) -> Result<i64, ApiError> {
        match self {
            CloudTypeValue::Int(v) => Ok(*v),
            CloudTypeValue::Text(s) => {
                parse_leading_int(s).ok_or_else(|| ApiError::InvalidCloudType(s.clone()))
            }
        }
    }
}

impl From<i64> for CloudTypeValue {
    fn from(value: i64) -> Self {
        CloudTypeValue::Int(value)
    }
}

impl From<i32> for CloudTypeValue {
    fn from(value: i32) -> Self {
        CloudTypeValue::Int(i64::from(value))
    }
}

impl From<&str> for CloudTypeValue {
    fn from(value: &str) -> Self {
        CloudTypeValue::Text(value.to_string())
    }
}

impl From<String> for CloudTypeValue {
    fn from(value: String) -> Self {
        CloudTypeValue::Text(value)
    }
}

impl From<CloudType> for CloudTypeValue {
    fn from(value: CloudType) -> Self {
        CloudTypeValue::Int(i64::from(value.code()))
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Caller-side description of a storage backend, used for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageMetaInput {
    pub name: String,
    pub cloud_type: CloudTypeValue,
    #[serde(default)]
    pub data_root: Option<String>,
    /// Arbitrary auth blob; sent to the server as its JSON text.
    #[serde(default)]
    pub auth: Option<Value>,
}

impl StorageMetaInput {
    pub fn new<N, C>(name: N, cloud_type: C) -> Self
    where
        N: Into<String>,
        C: Into<CloudTypeValue>,
    {
        StorageMetaInput {
            name: name.into(),
            cloud_type: cloud_type.into(),
            data_root: None,
            auth: None,
        }
    }

    pub fn data_root<D: Into<String>>(mut self, data_root: D) -> Self {
        self.data_root = Some(data_root.into());
        self
    }

    pub fn auth(mut self, auth: Value) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Produce the wire body. Every recognized field is present except the
    /// optional ones the caller left unset.
    pub fn to_body(&self) -> Result<StorageMetaBody, ApiError> {
        let auth = match &self.auth {
            Some(value) => Some(serde_json::to_string(value).map_err(ApiError::Serialization)?),
            None => None,
        };

        Ok(StorageMetaBody {
            name: self.name.clone(),
            cloud_type: self.cloud_type.to_code()?,
            data_root: self.data_root.clone(),
            auth,
        })
    }
}

/// Exact JSON body of `POST /storage/meta` and `POST /storage/meta/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMetaBody {
    pub name: String,
    pub cloud_type: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auth: Option<String>,
}

/// A storage backend record as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMeta {
    pub id: i32,
    pub name: String,
    pub cloud_type: i8,
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub status: i8,
    #[serde(default)]
    pub last_work_time: Option<i64>,
    #[serde(default)]
    pub total_quota: Option<u64>,
    #[serde(default)]
    pub used_quota: Option<u64>,
    #[serde(default)]
    pub remaining_quota: Option<u64>,
    #[serde(default)]
    pub extra: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u32>,
}

impl StorageMeta {
    pub fn kind(&self) -> Option<CloudType> {
        CloudType::from_code(i64::from(self.cloud_type))
    }

    pub fn meta_status(&self) -> MetaStatus {
        MetaStatus::from_code(self.status)
    }
}

/// Lifecycle of a storage backend on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaStatus {
    WaitInit,
    WaitDataRoot,
    Enable,
    InvalidRefresh,
    Disabled,
}

impl MetaStatus {
    pub fn code(&self) -> i8 {
        match self {
            MetaStatus::WaitInit => 0,
            MetaStatus::WaitDataRoot => 1,
            MetaStatus::Enable => 2,
            MetaStatus::InvalidRefresh => 3,
            MetaStatus::Disabled => 4,
        }
    }

    /// Unknown codes are treated as disabled.
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => MetaStatus::WaitInit,
            1 => MetaStatus::WaitDataRoot,
            2 => MetaStatus::Enable,
            3 => MetaStatus::InvalidRefresh,
            _ => MetaStatus::Disabled,
        }
    }
}

/// The backend's response wrapper. `code == 0` means success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user<C: Into<String>>(content: C) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn system<C: Into<String>>(content: C) -> Self {
        ChatMessage {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// Typed chat completion payload. Fields the struct does not model can be
/// passed through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new<M: Into<String>>(model: M, messages: Vec<ChatMessage>) -> Self {
        ChatCompletionRequest {
            model: model.into(),
            messages,
            temperature: None,
            stream: None,
            extra: Map::new(),
        }
    }
}

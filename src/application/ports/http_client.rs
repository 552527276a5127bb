//! HTTP Client Port - REST 客户端抽象
//!
//! 定义页面/Hook/领域服务所依赖的 HTTP 原语，具体实现在 infrastructure/http 层

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::product::ProductError;

/// URL 查询参数（有序，便于比较与日志）
pub type QueryParams = BTreeMap<String, String>;

/// 归一化后的 HTTP 错误
///
/// 所有适配器都把底层错误转换成这里的变体，调用方无需关心具体 HTTP 库
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("API error {errno}: {message}")]
    Api { errno: i32, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// 对应的 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Unauthorized => Some(401),
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ProductError> for HttpError {
    fn from(err: ProductError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// multipart 文件部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// multipart/form-data 上传表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let filename = filename.into();
        let mime = guess_mime(&filename).map(str::to_string);
        self.files.push(FilePart {
            field: field.into(),
            filename,
            bytes,
            mime,
        });
        self
    }

    /// 所有文件的总字节数
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes.len()).sum()
    }
}

fn guess_mime(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// HTTP Client Port
///
/// 每个方法返回解析后的 JSON 响应体，或归一化的 [`HttpError`]
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, HttpError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError>;

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError>;

    async fn delete(&self, path: &str) -> Result<Value, HttpError>;

    async fn upload(&self, path: &str, form: UploadForm) -> Result<Value, HttpError>;
}

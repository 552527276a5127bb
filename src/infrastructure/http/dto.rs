//! Response Body DTOs
//!
//! 统一响应信封 `{ "errno": 0, "error": "", "data": ... }` 的解析

use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::HttpError;

/// errno 约定（与 HTTP 状态码同值）
pub mod errno {
    pub const OK: i32 = 0;
    pub const UNAUTHORIZED: i32 = 401;
}

/// 统一 API 响应信封
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub errno: i32,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub data: Value,
}

impl ApiEnvelope {
    pub fn into_result(self) -> Result<Value, HttpError> {
        match self.errno {
            errno::OK => Ok(self.data),
            errno::UNAUTHORIZED => Err(HttpError::Unauthorized),
            code => Err(HttpError::Api {
                errno: code,
                message: self.error,
            }),
        }
    }
}

/// 解析响应体；空响应（如 204）视为 `null`
pub fn parse_body(bytes: &[u8]) -> Result<Value, HttpError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|e| HttpError::Decode(format!("Malformed JSON body: {}", e)))
}

/// 如果是信封则拆包，否则原样返回
pub fn unwrap_envelope(value: Value) -> Result<Value, HttpError> {
    let is_envelope = value
        .as_object()
        .map(|map| map.contains_key("errno"))
        .unwrap_or(false);
    if !is_envelope {
        return Ok(value);
    }

    let envelope: ApiEnvelope = serde_json::from_value(value)
        .map_err(|e| HttpError::Decode(format!("Malformed response envelope: {}", e)))?;
    envelope.into_result()
}

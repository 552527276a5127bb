//! HTTP Error Normalization
//!
//! 把 reqwest 错误和非 2xx 响应统一转换为 [`HttpError`]

use reqwest::StatusCode;
use serde_json::Value;

use crate::application::ports::HttpError;

/// 错误消息最大长度（原始响应文本会被截断）
const MAX_MESSAGE_LEN: usize = 200;

/// 传输层错误
pub fn from_reqwest(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else if err.is_connect() {
        HttpError::Network(format!("Cannot connect to API server: {}", err))
    } else if err.is_decode() {
        HttpError::Decode(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidRequest(err.to_string())
    } else {
        HttpError::Network(err.to_string())
    }
}

/// 非 2xx 响应
///
/// 消息优先取 JSON 的 `message` / `error` 字段，其次是原始文本，最后是状态码原因短语
pub fn from_status(status: StatusCode, body: &[u8]) -> HttpError {
    if status == StatusCode::UNAUTHORIZED {
        return HttpError::Unauthorized;
    }

    let message = extract_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    HttpError::Status {
        status: status.as_u16(),
        message,
    }
}

fn extract_message(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for field in ["message", "error", "msg"] {
            if let Some(Value::String(msg)) = map.get(field) {
                if !msg.trim().is_empty() {
                    return Some(msg.clone());
                }
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_MESSAGE_LEN).collect())
}

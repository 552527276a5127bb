//! HTTP Interceptors
//!
//! 拦截器按注册顺序执行:
//! - `on_request`: 发送前修改请求（加 header），也可以拒绝请求
//! - `on_response`: 观察响应状态码
//! - `on_error`: 观察归一化后的错误

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, StatusCode, Url};
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::ports::HttpError;

/// 请求拦截器
pub trait Interceptor: Send + Sync {
    /// 拦截器名称（用于日志）
    fn name(&self) -> &'static str;

    fn on_request(&self, _request: &mut Request) -> Result<(), HttpError> {
        Ok(())
    }

    fn on_response(&self, _method: &Method, _url: &Url, _status: StatusCode) {}

    fn on_error(&self, _method: &Method, _url: &str, _error: &HttpError) {}
}

/// 运行时可变的访问令牌
///
/// 克隆共享同一份令牌，登录/登出时直接 set/clear
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.filter(|t| !t.trim().is_empty()))),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Bearer 认证拦截器
pub struct AuthInterceptor {
    tokens: TokenStore,
}

impl AuthInterceptor {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

impl Interceptor for AuthInterceptor {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn on_request(&self, request: &mut Request) -> Result<(), HttpError> {
        let Some(token) = self.tokens.get() else {
            return Ok(());
        };
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HttpError::invalid_request(format!("Invalid auth token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }

    fn on_error(&self, method: &Method, url: &str, error: &HttpError) {
        if matches!(error, HttpError::Unauthorized) {
            tracing::warn!(
                method = %method,
                url = %url,
                has_token = self.tokens.get().is_some(),
                "Request rejected as unauthorized"
            );
        }
    }
}

/// 日志拦截器
///
/// 4xx 记 warn，5xx 与传输层错误记 error
#[derive(Debug, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn on_request(&self, request: &mut Request) -> Result<(), HttpError> {
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending API request");
        Ok(())
    }

    fn on_response(&self, method: &Method, url: &Url, status: StatusCode) {
        if status.is_server_error() {
            tracing::error!(method = %method, url = %url, status = %status.as_u16(), "HTTP server error");
        } else if status.is_client_error() {
            tracing::warn!(method = %method, url = %url, status = %status.as_u16(), "HTTP client error");
        } else {
            tracing::debug!(method = %method, url = %url, status = %status.as_u16(), "API response");
        }
    }

    fn on_error(&self, method: &Method, url: &str, error: &HttpError) {
        match error {
            HttpError::Network(_) | HttpError::Timeout => {
                tracing::error!(method = %method, url = %url, error = %error, "API request failed");
            }
            // 状态码错误已在 on_response 中记录
            HttpError::Status { .. } | HttpError::Unauthorized => {}
            _ => {
                tracing::warn!(method = %method, url = %url, error = %error, "API request failed");
            }
        }
    }
}

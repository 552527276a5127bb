//! Reqwest HTTP Client - 调用商品 REST API
//!
//! 实现 HttpClientPort trait:
//! - base_url 与路径拼接
//! - 拦截器链（认证、日志）
//! - 错误归一化、可选的响应信封拆包
//! - multipart 上传

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{HttpClientPort, HttpError, QueryParams, UploadForm};

use super::dto;
use super::error::{from_reqwest, from_status};
use super::interceptors::{AuthInterceptor, Interceptor, LoggingInterceptor, TokenStore};

/// API 客户端配置
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 是否拆包 `{errno, error, data}` 信封
    pub unwrap_envelope: bool,
    /// User-Agent
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
            unwrap_envelope: true,
            user_agent: format!("shopfront/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_envelope(mut self, unwrap_envelope: bool) -> Self {
        self.unwrap_envelope = unwrap_envelope;
        self
    }
}

/// 基于 reqwest 的 HTTP 客户端
///
/// 显式构造后以 `Arc<dyn HttpClientPort>` 注入，不使用全局单例
pub struct ReqwestHttpClient {
    client: Client,
    config: ApiClientConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ReqwestHttpClient {
    /// 创建不带拦截器的客户端
    pub fn new(config: ApiClientConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            interceptors: Vec::new(),
        })
    }

    /// 创建带认证与日志拦截器的客户端
    pub fn with_default_interceptors(
        config: ApiClientConfig,
        tokens: TokenStore,
    ) -> Result<Self, HttpError> {
        Ok(Self::new(config)?
            .with_interceptor(Arc::new(AuthInterceptor::new(tokens)))
            .with_interceptor(Arc::new(LoggingInterceptor)))
    }

    /// 追加拦截器（按追加顺序执行）
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        tracing::debug!(interceptor = interceptor.name(), "Interceptor registered");
        self.interceptors.push(interceptor);
        self
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// 拼接完整 URL，保证中间只有一个 `/`
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Value, HttpError> {
        let url = self.url(path);
        let result = match self.prepare(&method, &url, build) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            for interceptor in &self.interceptors {
                interceptor.on_error(&method, &url, e);
            }
        }
        result
    }

    /// 构建请求并依次交给拦截器
    fn prepare(
        &self,
        method: &Method,
        url: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<reqwest::Request, HttpError> {
        let mut request = build(self.client.request(method.clone(), url))
            .build()
            .map_err(from_reqwest)?;

        for interceptor in &self.interceptors {
            interceptor.on_request(&mut request)?;
        }
        Ok(request)
    }

    async fn dispatch(&self, request: reqwest::Request) -> Result<Value, HttpError> {
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await.map_err(from_reqwest)?;

        let status = response.status();
        for interceptor in &self.interceptors {
            interceptor.on_response(&method, &url, status);
        }

        let body = response.bytes().await.map_err(from_reqwest)?;
        if !status.is_success() {
            return Err(from_status(status, &body));
        }

        let value = dto::parse_body(&body)?;
        if self.config.unwrap_envelope {
            dto::unwrap_envelope(value)
        } else {
            Ok(value)
        }
    }
}

fn to_multipart(form: UploadForm) -> Result<Form, HttpError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    for file in form.files {
        let mut part = Part::bytes(file.bytes).file_name(file.filename);
        if let Some(mime) = file.mime {
            part = part
                .mime_str(&mime)
                .map_err(|e| HttpError::invalid_request(format!("Invalid mime type: {}", e)))?;
        }
        multipart = multipart.part(file.field, part);
    }
    Ok(multipart)
}

#[async_trait]
impl HttpClientPort for ReqwestHttpClient {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, HttpError> {
        self.execute(Method::GET, path, |builder| {
            if params.is_empty() {
                builder
            } else {
                builder.query(params)
            }
        })
        .await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.execute(Method::POST, path, |builder| builder.json(&body))
            .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.execute(Method::PUT, path, |builder| builder.json(&body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.execute(Method::DELETE, path, |builder| builder).await
    }

    async fn upload(&self, path: &str, form: UploadForm) -> Result<Value, HttpError> {
        let multipart = to_multipart(form)?;
        self.execute(Method::POST, path, |builder| builder.multipart(multipart))
            .await
    }
}

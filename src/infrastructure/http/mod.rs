//! HTTP Layer - REST 客户端实现
//!
//! - client: 基于 reqwest 的 HttpClientPort 实现
//! - interceptors: 认证/日志拦截器
//! - error: 错误归一化
//! - dto: 响应体与信封解析
//! - fake_client: 测试与离线模式使用的内存实现

mod client;
mod dto;
mod error;
mod fake_client;
mod interceptors;

pub use client::{ApiClientConfig, ReqwestHttpClient};
pub use fake_client::{FakeHttpClient, RecordedCall};
pub use interceptors::{AuthInterceptor, Interceptor, LoggingInterceptor, TokenStore};

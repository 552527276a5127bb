//! Infrastructure Layer - 基础设施层
//!
//! 提供端口的具体实现与对外入口

pub mod cli;
pub mod http;

pub use http::{ApiClientConfig, FakeHttpClient, ReqwestHttpClient, TokenStore};

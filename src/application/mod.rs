//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: HTTP 客户端端口与归一化错误
//! - hooks: 通用数据拉取 / 写操作 Hook（use_api、use_mutation）
//! - services: 按资源划分的领域服务（ProductService）

pub mod hooks;
pub mod ports;
pub mod services;

pub use hooks::{use_api, use_mutation, ApiHook, FetchOptions, MutationHook, RequestState};
pub use ports::{FilePart, HttpClientPort, HttpError, QueryParams, UploadForm};
pub use services::{endpoints, ProductService};

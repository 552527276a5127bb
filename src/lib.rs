//! Shopfront - 商品目录客户端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Product Context: 商品、分类、创建/更新载荷
//!
//! 应用层 (application/):
//! - Ports: HttpClientPort + 归一化的 HttpError
//! - Hooks: use_api（自动拉取）、use_mutation（显式写操作）
//! - Services: ProductService，商品 REST 接口门面
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: reqwest 客户端、拦截器、错误归一化、Fake 客户端
//! - CLI: 命令行参数与文本页面
//!
//! 数据流: Page → Hook → Service / HttpClientPort → ReqwestHttpClient → 网络

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

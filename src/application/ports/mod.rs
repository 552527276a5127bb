//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod http_client;

pub use http_client::{FilePart, HttpClientPort, HttpError, QueryParams, UploadForm};

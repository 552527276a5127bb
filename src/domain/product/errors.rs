//! Product Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductError {
    #[error("无效的商品名称: {0}")]
    InvalidName(String),

    #[error("无效的商品价格: {0}")]
    InvalidPrice(f64),

    #[error("搜索关键字不能为空")]
    EmptyKeyword,

    #[error("无效的商品 ID: {0}")]
    InvalidId(String),
}

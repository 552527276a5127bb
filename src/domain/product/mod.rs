//! Product Context - 商品限界上下文
//!
//! 职责:
//! - 商品与分类实体
//! - 商品创建/更新载荷及其校验
//! - 列表查询参数

mod entities;
mod errors;
mod value_objects;

pub use entities::{Category, Product, ProductPage, UploadedImage};
pub use errors::ProductError;
pub use value_objects::{NewProduct, ProductId, ProductQuery, ProductUpdate};

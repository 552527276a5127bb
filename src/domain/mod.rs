//! Domain Layer - 领域层
//!
//! 包含一个限界上下文:
//! - Product Context: 商品与分类

pub mod product;

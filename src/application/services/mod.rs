//! Domain Services - 按资源划分的 REST 门面

mod product_service;

pub use product_service::{endpoints, ProductService};

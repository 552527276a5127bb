//! Product Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProductId;

/// 商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "image", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// 商品分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "product_count")]
    pub product_count: u64,
}

/// 图片上传结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// 商品列表
///
/// 列表接口可能返回裸数组，也可能返回 `{ items|list|data: [...], total }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductPage {
    Bare(Vec<Product>),
    Paged {
        #[serde(alias = "list", alias = "data")]
        items: Vec<Product>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl ProductPage {
    pub fn total(&self) -> u64 {
        match self {
            ProductPage::Bare(items) => items.len() as u64,
            ProductPage::Paged { items, total } => total.unwrap_or(items.len() as u64),
        }
    }

    pub fn into_items(self) -> Vec<Product> {
        match self {
            ProductPage::Bare(items) | ProductPage::Paged { items, .. } => items,
        }
    }
}

//! Product Context - Value Objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::ProductError;

/// 商品名称最大长度
const MAX_NAME_LEN: usize = 200;

/// 商品唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ProductId {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ProductError::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// 创建商品载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            category: None,
            image_url: None,
            stock: 0,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// 发送前校验
    pub fn validate(&self) -> Result<(), ProductError> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// 更新商品载荷，只序列化出现的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), ProductError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// 商品列表查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ProductQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// 转换为 URL 查询参数
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        if let Some(page) = self.page {
            params.insert("page".to_string(), page.to_string());
        }
        if let Some(page_size) = self.page_size {
            params.insert("pageSize".to_string(), page_size.to_string());
        }
        if let Some(category) = &self.category {
            params.insert("category".to_string(), category.clone());
        }
        if let Some(sort) = &self.sort {
            params.insert("sort".to_string(), sort.clone());
        }
        params
    }
}

fn validate_name(name: &str) -> Result<(), ProductError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProductError::InvalidName("商品名称不能为空".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ProductError::InvalidName(format!(
            "商品名称长度不能超过{}字符",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ProductError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ProductError::InvalidPrice(price));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse() {
        assert_eq!("42".parse::<ProductId>(), Ok(ProductId::new(42)));
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_new_product_validation() {
        assert!(NewProduct::new("Keyboard", 99.0).validate().is_ok());
        assert!(matches!(
            NewProduct::new("   ", 1.0).validate(),
            Err(ProductError::InvalidName(_))
        ));
        assert!(matches!(
            NewProduct::new("Mouse", -1.0).validate(),
            Err(ProductError::InvalidPrice(_))
        ));
        assert!(NewProduct::new("Mouse", f64::NAN).validate().is_err());
        assert!(NewProduct::new("x".repeat(201), 1.0).validate().is_err());
    }

    #[test]
    fn test_new_product_serialization_skips_absent_fields() {
        let value = serde_json::to_value(NewProduct::new("B", 3.5)).unwrap();
        assert_eq!(value, serde_json::json!({"name": "B", "price": 3.5, "stock": 0}));
    }

    #[test]
    fn test_product_update_only_present_fields() {
        let update = ProductUpdate {
            price: Some(12.0),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"price": 12.0})
        );
        assert!(ProductUpdate::default().is_empty());
    }

    #[test]
    fn test_query_params() {
        let params = ProductQuery::default().page(2).page_size(20).category("books").to_params();
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
        assert_eq!(params.get("pageSize").map(String::as_str), Some("20"));
        assert_eq!(params.get("category").map(String::as_str), Some("books"));
        assert!(!params.contains_key("sort"));
    }
}

//! Product Service - 商品 REST 接口门面
//!
//! 每个方法对应一个 endpoint + HTTP 动词，不做缓存或批处理

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::application::ports::{HttpClientPort, HttpError, QueryParams, UploadForm};
use crate::domain::product::{
    Category, NewProduct, Product, ProductError, ProductId, ProductPage, ProductQuery,
    ProductUpdate, UploadedImage,
};

/// 商品相关 endpoint
pub mod endpoints {
    pub const PRODUCTS: &str = "/products";
    pub const CATEGORIES: &str = "/products/categories";
    pub const SEARCH: &str = "/products/search";
    pub const HOT: &str = "/products/hot";
    pub const RECOMMENDED: &str = "/products/recommended";
    pub const UPLOAD: &str = "/products/upload";

    pub fn product(id: impl std::fmt::Display) -> String {
        format!("{}/{}", PRODUCTS, id)
    }
}

/// 上传表单中的文件字段名
const UPLOAD_FIELD: &str = "file";

/// 商品服务
#[derive(Clone)]
pub struct ProductService {
    client: Arc<dyn HttpClientPort>,
}

impl ProductService {
    pub fn new(client: Arc<dyn HttpClientPort>) -> Self {
        Self { client }
    }

    /// 底层 HTTP 客户端，供 Hook 直接使用
    pub fn client(&self) -> Arc<dyn HttpClientPort> {
        self.client.clone()
    }

    /// GET /products
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, HttpError> {
        let value = self.client.get(endpoints::PRODUCTS, &query.to_params()).await?;
        decode(value)
    }

    /// GET /products/{id}
    pub async fn get_product(&self, id: ProductId) -> Result<Product, HttpError> {
        let value = self
            .client
            .get(&endpoints::product(id), &QueryParams::new())
            .await?;
        decode(value)
    }

    /// POST /products
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, HttpError> {
        product.validate()?;
        let body = serde_json::to_value(&product)?;
        let value = self.client.post(endpoints::PRODUCTS, body).await?;
        tracing::info!(name = %product.name, "Product created");
        decode(value)
    }

    /// PUT /products/{id}
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, HttpError> {
        update.validate()?;
        if update.is_empty() {
            return Err(HttpError::invalid_request("Update contains no fields"));
        }
        let body = serde_json::to_value(&update)?;
        let value = self.client.put(&endpoints::product(id), body).await?;
        decode(value)
    }

    /// DELETE /products/{id}
    pub async fn delete_product(&self, id: ProductId) -> Result<(), HttpError> {
        self.client.delete(&endpoints::product(id)).await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// GET /products/categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, HttpError> {
        let value = self
            .client
            .get(endpoints::CATEGORIES, &QueryParams::new())
            .await?;
        decode(value)
    }

    /// GET /products/search?keyword=...
    pub async fn search_products(
        &self,
        keyword: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, HttpError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ProductError::EmptyKeyword.into());
        }
        let mut params = query.to_params();
        params.insert("keyword".to_string(), keyword.to_string());
        let value = self.client.get(endpoints::SEARCH, &params).await?;
        decode(value)
    }

    /// GET /products/hot?limit=...
    pub async fn hot_products(&self, limit: Option<u32>) -> Result<Vec<Product>, HttpError> {
        let value = self.client.get(endpoints::HOT, &limit_params(limit)).await?;
        decode::<ProductPage>(value).map(ProductPage::into_items)
    }

    /// GET /products/recommended?limit=...
    pub async fn recommended_products(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Product>, HttpError> {
        let value = self
            .client
            .get(endpoints::RECOMMENDED, &limit_params(limit))
            .await?;
        decode::<ProductPage>(value).map(ProductPage::into_items)
    }

    /// POST /products/upload (multipart)
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, HttpError> {
        if bytes.is_empty() {
            return Err(HttpError::invalid_request("Upload file is empty"));
        }
        let form = UploadForm::new().file(UPLOAD_FIELD, filename, bytes);
        tracing::debug!(filename = %filename, size = form.total_bytes(), "Uploading product image");
        let value = self.client.upload(endpoints::UPLOAD, form).await?;
        decode(value)
    }
}

fn limit_params(limit: Option<u32>) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(limit) = limit {
        params.insert("limit".to_string(), limit.to_string());
    }
    params
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, HttpError> {
    serde_json::from_value(value).map_err(HttpError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::FakeHttpClient;
    use serde_json::json;

    fn service() -> (ProductService, Arc<FakeHttpClient>) {
        let client = Arc::new(FakeHttpClient::new());
        (ProductService::new(client.clone()), client)
    }

    #[tokio::test]
    async fn test_list_products_passes_query() {
        let (service, client) = service();
        client.respond("GET", "/products", json!({"items": [{"id": 1, "name": "A"}], "total": 9}));

        let page = service
            .list_products(&ProductQuery::default().page(2))
            .await
            .unwrap();
        assert_eq!(page.total(), 9);

        let call = &client.calls()[0];
        assert_eq!(call.method, "GET");
        assert_eq!(call.params.get("page").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_get_product_uses_id_path() {
        let (service, client) = service();
        client.respond("GET", "/products/5", json!({"id": 5, "name": "Desk", "price": 120.0}));

        let product = service.get_product(ProductId::new(5)).await.unwrap();
        assert_eq!(product.name, "Desk");
        assert_eq!(client.calls()[0].path, "/products/5");
    }

    #[tokio::test]
    async fn test_create_product_posts_body() {
        let (service, client) = service();
        client.respond("POST", "/products", json!({"id": 3, "name": "B", "price": 2.5}));

        let created = service.create_product(NewProduct::new("B", 2.5)).await.unwrap();
        assert_eq!(created.id, ProductId::new(3));
        assert_eq!(
            client.calls()[0].body,
            Some(json!({"name": "B", "price": 2.5, "stock": 0}))
        );
    }

    #[tokio::test]
    async fn test_create_invalid_product_skips_network() {
        let (service, client) = service();
        let result = service.create_product(NewProduct::new("", 1.0)).await;
        assert!(matches!(result, Err(HttpError::InvalidRequest(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (service, client) = service();
        client.respond("PUT", "/products/8", json!({"id": 8, "name": "New"}));
        client.respond("DELETE", "/products/8", serde_json::Value::Null);

        let update = ProductUpdate {
            name: Some("New".to_string()),
            ..Default::default()
        };
        let updated = service.update_product(ProductId::new(8), update).await.unwrap();
        assert_eq!(updated.name, "New");
        service.delete_product(ProductId::new(8)).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls[0].body, Some(json!({"name": "New"})));
        assert_eq!(calls[1].method, "DELETE");
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let (service, client) = service();
        let result = service
            .update_product(ProductId::new(1), ProductUpdate::default())
            .await;
        assert!(matches!(result, Err(HttpError::InvalidRequest(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_requires_keyword() {
        let (service, client) = service();
        let result = service.search_products("  ", &ProductQuery::default()).await;
        assert!(matches!(result, Err(HttpError::InvalidRequest(_))));
        assert_eq!(client.call_count(), 0);

        client.respond("GET", "/products/search", json!([]));
        service
            .search_products(" lamp ", &ProductQuery::default())
            .await
            .unwrap();
        assert_eq!(
            client.calls()[0].params.get("keyword").map(String::as_str),
            Some("lamp")
        );
    }

    #[tokio::test]
    async fn test_hot_and_recommended_limits() {
        let (service, client) = service();
        client.respond("GET", "/products/hot", json!([{"id": 1, "name": "A"}]));
        client.respond("GET", "/products/recommended", json!({"list": []}));

        assert_eq!(service.hot_products(Some(5)).await.unwrap().len(), 1);
        assert!(service.recommended_products(None).await.unwrap().is_empty());

        let calls = client.calls();
        assert_eq!(calls[0].params.get("limit").map(String::as_str), Some("5"));
        assert!(calls[1].params.is_empty());
    }

    #[tokio::test]
    async fn test_list_categories() {
        let (service, client) = service();
        client.respond(
            "GET",
            "/products/categories",
            json!([{"id": 1, "name": "Books", "productCount": 4}]),
        );
        let categories = service.list_categories().await.unwrap();
        assert_eq!(categories[0].product_count, 4);
    }

    #[tokio::test]
    async fn test_upload_image_sends_file_field() {
        let (service, client) = service();
        client.respond("POST", "/products/upload", json!({"url": "http://cdn/x.png"}));

        let image = service.upload_image("x.png", vec![9, 9]).await.unwrap();
        assert_eq!(image.url, "http://cdn/x.png");

        let form = client.calls()[0].form.clone().unwrap();
        assert_eq!(form.files[0].field, "file");
        assert_eq!(form.files[0].mime.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_upload_empty_file_rejected() {
        let (service, client) = service();
        assert!(service.upload_image("x.png", Vec::new()).await.is_err());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let (service, client) = service();
        client.fail("GET", "/products/2", HttpError::Unauthorized);
        assert_eq!(
            service.get_product(ProductId::new(2)).await,
            Err(HttpError::Unauthorized)
        );
    }
}

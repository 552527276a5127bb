//! Fake HTTP Client - 用于测试与离线演示的 HTTP 客户端
//!
//! 按 `(method, path)` 返回预置响应，并记录每一次调用，不访问网络

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::application::ports::{HttpClientPort, HttpError, QueryParams, UploadForm};

/// 一次被记录的调用
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<Value>,
    pub form: Option<UploadForm>,
}

#[derive(Debug, Clone, Default)]
struct Route {
    outcome: Option<Result<Value, HttpError>>,
    delay: Option<Duration>,
}

/// Fake HTTP Client
#[derive(Debug, Default)]
pub struct FakeHttpClient {
    routes: DashMap<(String, String), Route>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一份示例商品目录（离线模式使用）
    pub fn with_demo_catalog() -> Self {
        let client = Self::new();
        let products = json!([
            {"id": 1, "name": "Mechanical Keyboard", "price": 89.0, "category": "peripherals", "stock": 12, "tags": ["hot"]},
            {"id": 2, "name": "Wireless Mouse", "price": 25.5, "category": "peripherals", "stock": 40},
            {"id": 3, "name": "27\" Monitor", "price": 219.0, "category": "displays", "stock": 0},
            {"id": 4, "name": "USB-C Hub", "price": 39.9, "category": "accessories", "stock": 7, "tags": ["recommended"]}
        ]);

        if let Value::Array(items) = &products {
            for item in items {
                if let Some(id) = item.get("id").and_then(Value::as_u64) {
                    client.respond("GET", &format!("/products/{}", id), item.clone());
                    client.respond("PUT", &format!("/products/{}", id), item.clone());
                    client.respond("DELETE", &format!("/products/{}", id), Value::Null);
                }
            }
        }

        client.respond("GET", "/products", json!({"items": products.clone(), "total": 4}));
        client.respond("GET", "/products/search", products.clone());
        client.respond("GET", "/products/hot", json!([products[0].clone(), products[1].clone()]));
        client.respond("GET", "/products/recommended", json!([products[3].clone()]));
        client.respond(
            "GET",
            "/products/categories",
            json!([
                {"id": 1, "name": "peripherals", "productCount": 2},
                {"id": 2, "name": "displays", "productCount": 1},
                {"id": 3, "name": "accessories", "productCount": 1}
            ]),
        );
        client.respond(
            "POST",
            "/products",
            json!({"id": 5, "name": "New Product", "price": 0.0}),
        );
        client.respond(
            "POST",
            "/products/upload",
            json!({"url": "https://cdn.example.com/uploads/demo.png", "filename": "demo.png"}),
        );
        client
    }

    /// 预置成功响应
    pub fn respond(&self, method: &str, path: &str, body: Value) {
        self.route(method, path).outcome = Some(Ok(body));
    }

    /// 预置失败响应
    pub fn fail(&self, method: &str, path: &str, error: HttpError) {
        self.route(method, path).outcome = Some(Err(error));
    }

    /// 为路由增加响应延迟
    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.route(method, path).delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn route(&self, method: &str, path: &str) -> dashmap::mapref::one::RefMut<'_, (String, String), Route> {
        self.routes
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
    }

    async fn handle(&self, call: RecordedCall) -> Result<Value, HttpError> {
        let key = (call.method.to_string(), call.path.clone());
        tracing::debug!(method = call.method, path = %call.path, "FakeHttpClient: handling request");

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        // 读出后立即释放 DashMap 引用，避免跨 await 持锁
        let route = self.routes.get(&key).map(|r| r.value().clone());
        let Some(route) = route else {
            return Err(HttpError::Status {
                status: 404,
                message: format!("No route for {} {}", key.0, key.1),
            });
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        route.outcome.unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl HttpClientPort for FakeHttpClient {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, HttpError> {
        self.handle(RecordedCall {
            method: "GET",
            path: path.to_string(),
            params: params.clone(),
            body: None,
            form: None,
        })
        .await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.handle(RecordedCall {
            method: "POST",
            path: path.to_string(),
            params: QueryParams::new(),
            body: Some(body),
            form: None,
        })
        .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.handle(RecordedCall {
            method: "PUT",
            path: path.to_string(),
            params: QueryParams::new(),
            body: Some(body),
            form: None,
        })
        .await
    }

    async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.handle(RecordedCall {
            method: "DELETE",
            path: path.to_string(),
            params: QueryParams::new(),
            body: None,
            form: None,
        })
        .await
    }

    async fn upload(&self, path: &str, form: UploadForm) -> Result<Value, HttpError> {
        self.handle(RecordedCall {
            method: "POST",
            path: path.to_string(),
            params: QueryParams::new(),
            body: None,
            form: Some(form),
        })
        .await
    }
}

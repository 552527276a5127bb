//! Fetch Hook - 自动拉取数据的 Hook
//!
//! [`ApiHook`] 把一个资源路径（locator）绑定到 GET 请求:
//!
//! 1. locator 为空或 `enabled = false` 时不发起任何请求
//! 2. locator 或 options 变化（按值比较）时自动重新拉取
//! 3. `refetch()` 按需重跑同一套拉取逻辑
//!
//! 旧请求不会在网络层被取消，但其结果在过期后会被丢弃，不会覆盖新状态。
//!
//! # Example
//!
//! ```rust,ignore
//! let hook = use_api::<Vec<Product>>(client.clone(), "/products", FetchOptions::default()).await;
//! let state = hook.state();
//! if let Some(products) = state.data() {
//!     println!("{} products", products.len());
//! }
//! ```

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::ports::{HttpClientPort, HttpError, QueryParams};

use super::state::{RequestState, StateCell};

/// 拉取选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// URL 查询参数
    pub params: QueryParams,
    /// 为 false 时等同于没有 locator（惰性查询）
    pub enabled: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            params: QueryParams::new(),
            enabled: true,
        }
    }
}

impl FetchOptions {
    pub fn with_params(params: QueryParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 当前请求的输入
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestKey {
    locator: Option<String>,
    options: FetchOptions,
}

impl RequestKey {
    /// 需要发起请求时返回路径
    fn active_path(&self) -> Option<&str> {
        match &self.locator {
            Some(path) if self.options.enabled => Some(path.as_str()),
            _ => None,
        }
    }
}

fn normalize_locator(locator: impl Into<String>) -> Option<String> {
    let locator = locator.into();
    if locator.trim().is_empty() {
        None
    } else {
        Some(locator)
    }
}

struct Inner<T> {
    client: Arc<dyn HttpClientPort>,
    key: watch::Sender<RequestKey>,
    cell: StateCell<T>,
}

/// 数据拉取 Hook
///
/// `Clone` 只复制句柄，所有副本共享同一份状态
pub struct ApiHook<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ApiHook<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ApiHook<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// 创建 Hook，但不发起请求
    pub fn new(
        client: Arc<dyn HttpClientPort>,
        locator: impl Into<String>,
        options: FetchOptions,
    ) -> Self {
        let (key, _) = watch::channel(RequestKey {
            locator: normalize_locator(locator),
            options,
        });
        Self {
            inner: Arc::new(Inner {
                client,
                key,
                cell: StateCell::new(),
            }),
        }
    }

    /// 当前状态快照
    pub fn state(&self) -> RequestState<T> {
        self.inner.cell.snapshot()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.inner.cell.subscribe()
    }

    pub fn locator(&self) -> Option<String> {
        self.inner.key.borrow().locator.clone()
    }

    pub fn options(&self) -> FetchOptions {
        self.inner.key.borrow().options.clone()
    }

    /// 按需重新拉取
    pub async fn refetch(&self) -> RequestState<T> {
        self.run().await
    }

    /// 切换 locator；值不变时不会重新拉取
    pub async fn set_locator(&self, locator: impl Into<String>) -> RequestState<T> {
        let locator = normalize_locator(locator);
        let changed = self.inner.key.send_if_modified(|key| {
            if key.locator == locator {
                return false;
            }
            key.locator = locator;
            true
        });
        self.on_key_changed(changed).await
    }

    /// 切换 options；值不变时不会重新拉取
    pub async fn set_options(&self, options: FetchOptions) -> RequestState<T> {
        let changed = self.inner.key.send_if_modified(|key| {
            if key.options == options {
                return false;
            }
            key.options = options;
            true
        });
        self.on_key_changed(changed).await
    }

    /// 同时切换 locator 和 options，最多触发一次拉取
    pub async fn update(
        &self,
        locator: impl Into<String>,
        options: FetchOptions,
    ) -> RequestState<T> {
        let next = RequestKey {
            locator: normalize_locator(locator),
            options,
        };
        let changed = self.inner.key.send_if_modified(|key| {
            if *key == next {
                return false;
            }
            *key = next;
            true
        });
        self.on_key_changed(changed).await
    }

    async fn on_key_changed(&self, changed: bool) -> RequestState<T> {
        if !changed {
            return self.state();
        }
        let active = self.inner.key.borrow().active_path().is_some();
        if active {
            self.run().await
        } else {
            // 输入被清空：进行中的请求作废
            self.inner.cell.supersede();
            self.state()
        }
    }

    async fn run(&self) -> RequestState<T> {
        // key 在 begin 的写锁内读取：generation 越新，读到的 key 也越新
        let started = self.inner.cell.begin_with(|| {
            let key = self.inner.key.borrow();
            key.active_path()
                .map(|path| (path.to_string(), key.options.params.clone()))
        });
        let Some((generation, (path, params))) = started else {
            tracing::trace!("Fetch skipped: no active locator");
            return self.state();
        };
        tracing::debug!(path = %path, generation, "Fetching resource");

        let result = self
            .inner
            .client
            .get(&path, &params)
            .await
            .and_then(|value| serde_json::from_value::<T>(value).map_err(HttpError::from));

        if let Err(e) = &result {
            tracing::warn!(path = %path, generation, error = %e, "Fetch failed");
        }

        if !self.inner.cell.finish(generation, result) {
            tracing::debug!(
                path = %path,
                generation,
                latest = self.inner.cell.generation(),
                "Discarding superseded response"
            );
        }

        self.state()
    }
}

/// 创建 Hook 并立即执行首次拉取（locator 为空时跳过）
pub async fn use_api<T>(
    client: Arc<dyn HttpClientPort>,
    locator: impl Into<String>,
    options: FetchOptions,
) -> ApiHook<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let hook = ApiHook::new(client, locator, options);
    hook.run().await;
    hook
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::FakeHttpClient;
    use serde_json::json;
    use std::time::Duration;

    fn fake() -> Arc<FakeHttpClient> {
        Arc::new(FakeHttpClient::new())
    }

    #[tokio::test]
    async fn test_empty_locator_never_calls_network() {
        let client = fake();
        let hook = use_api::<serde_json::Value>(client.clone(), "", FetchOptions::default()).await;

        assert_eq!(client.call_count(), 0);
        assert_eq!(hook.state(), RequestState::default());

        hook.refetch().await;
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_options_never_call_network() {
        let client = fake();
        client.respond("GET", "/products", json!([]));
        let hook = use_api::<serde_json::Value>(
            client.clone(),
            "/products",
            FetchOptions::default().enabled(false),
        )
        .await;

        assert_eq!(client.call_count(), 0);
        assert!(hook.state().is_idle());
    }

    #[tokio::test]
    async fn test_success_sets_data() {
        let client = fake();
        client.respond("GET", "/products", json!([{"id": 1, "name": "A"}]));

        let hook = use_api::<serde_json::Value>(client.clone(), "/products", FetchOptions::default())
            .await;

        assert_eq!(
            hook.state(),
            RequestState {
                data: Some(json!([{"id": 1, "name": "A"}])),
                loading: false,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_failure_preserves_prior_data() {
        let client = fake();
        client.respond("GET", "/products/1", json!({"id": 1}));
        let hook = use_api::<serde_json::Value>(client.clone(), "/products/1", FetchOptions::default())
            .await;

        client.fail("GET", "/products/1", HttpError::network("connection reset"));
        let state = hook.refetch().await;

        assert_eq!(state.data, Some(json!({"id": 1})));
        assert_eq!(state.error, Some(HttpError::network("connection reset")));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_decode_failure_is_an_error() {
        let client = fake();
        client.respond("GET", "/count", json!("not a number"));
        let hook = use_api::<u32>(client, "/count", FetchOptions::default()).await;

        assert!(matches!(hook.state().error, Some(HttpError::Decode(_))));
        assert_eq!(hook.state().data, None);
    }

    #[tokio::test]
    async fn test_refetch_twice_issues_two_calls() {
        let client = fake();
        client.respond("GET", "/products", json!([]));
        let hook = ApiHook::<serde_json::Value>::new(
            client.clone(),
            "/products",
            FetchOptions::default(),
        );

        hook.refetch().await;
        hook.refetch().await;
        assert_eq!(client.call_count(), 2);
        assert_eq!(hook.state().data, Some(json!([])));
    }

    #[tokio::test]
    async fn test_refetch_clears_stale_error_on_success() {
        let client = fake();
        client.fail("GET", "/products", HttpError::Timeout);
        let hook = use_api::<serde_json::Value>(client.clone(), "/products", FetchOptions::default())
            .await;
        assert_eq!(hook.state().error, Some(HttpError::Timeout));

        client.respond("GET", "/products", json!([1]));
        let state = hook.refetch().await;
        assert_eq!(state.error, None);
        assert_eq!(state.data, Some(json!([1])));
    }

    #[tokio::test]
    async fn test_locator_change_triggers_fetch_only_when_different() {
        let client = fake();
        client.respond("GET", "/products/1", json!({"id": 1}));
        client.respond("GET", "/products/2", json!({"id": 2}));
        let hook = use_api::<serde_json::Value>(client.clone(), "/products/1", FetchOptions::default())
            .await;
        assert_eq!(client.call_count(), 1);

        hook.set_locator("/products/1").await;
        assert_eq!(client.call_count(), 1);

        let state = hook.set_locator("/products/2").await;
        assert_eq!(client.call_count(), 2);
        assert_eq!(state.data, Some(json!({"id": 2})));
    }

    #[tokio::test]
    async fn test_options_change_triggers_fetch_with_params() {
        let client = fake();
        client.respond("GET", "/products", json!([]));
        let hook = use_api::<serde_json::Value>(client.clone(), "/products", FetchOptions::default())
            .await;

        hook.set_options(FetchOptions::default().param("page", 2)).await;
        hook.set_options(FetchOptions::default().param("page", 2)).await;

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].params.get("page").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_update_with_same_key_is_noop() {
        let client = fake();
        client.respond("GET", "/products", json!([]));
        let hook = use_api::<serde_json::Value>(client.clone(), "/products", FetchOptions::default())
            .await;

        hook.update("/products", FetchOptions::default()).await;
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_order_completion_keeps_latest() {
        let client = fake();
        client.respond("GET", "/slow", json!("slow"));
        client.respond("GET", "/fast", json!("fast"));
        client.delay("GET", "/slow", Duration::from_millis(200));

        let hook = ApiHook::<String>::new(client.clone(), "/slow", FetchOptions::default());
        let slow = tokio::spawn({
            let hook = hook.clone();
            async move { hook.refetch().await }
        });
        // 确保慢请求先开始
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = hook.set_locator("/fast").await;
        assert_eq!(state.data.as_deref(), Some("fast"));

        slow.await.unwrap();
        let state = hook.state();
        assert_eq!(state.data.as_deref(), Some("fast"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clearing_locator_drops_in_flight_result() {
        let client = fake();
        client.respond("GET", "/slow", json!("late"));
        client.delay("GET", "/slow", Duration::from_millis(100));

        let hook = ApiHook::<String>::new(client.clone(), "/slow", FetchOptions::default());
        let pending = tokio::spawn({
            let hook = hook.clone();
            async move { hook.refetch().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(hook.state().loading);

        let state = hook.set_locator("").await;
        assert!(!state.loading);

        pending.await.unwrap();
        assert_eq!(hook.state().data, None);
        assert_eq!(hook.locator(), None);
    }

    #[tokio::test]
    async fn test_subscriber_observes_loading_then_data() {
        let client = fake();
        client.respond("GET", "/products", json!([]));
        let hook = ApiHook::<serde_json::Value>::new(client, "/products", FetchOptions::default());
        let mut rx = hook.subscribe();

        let task = tokio::spawn({
            let hook = hook.clone();
            async move { hook.refetch().await }
        });

        rx.changed().await.unwrap();
        let mut saw_data = rx.borrow_and_update().data.is_some();
        while !saw_data {
            rx.changed().await.unwrap();
            saw_data = rx.borrow_and_update().data.is_some();
        }
        task.await.unwrap();
        assert!(!hook.state().loading);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_locator_changes_settle_on_latest() {
        let client = fake();
        for i in 0..16u64 {
            let path = format!("/products/{}", i);
            client.respond("GET", &path, json!(path.clone()));
            client.delay("GET", &path, Duration::from_millis((i * 7) % 5));
        }
        let hook = ApiHook::<String>::new(client, "", FetchOptions::default());

        let tasks: Vec<_> = (0..16u64)
            .map(|i| {
                let hook = hook.clone();
                tokio::spawn(async move { hook.set_locator(format!("/products/{}", i)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let state = hook.state();
        assert!(!state.loading);
        assert_eq!(state.data, hook.locator());
    }
}

//! Mutation Hook - 显式触发的写操作
//!
//! [`MutationHook`] 包装任意异步操作，只在调用 [`MutationHook::mutate`] 时执行。
//! 成功时保存并返回结果；失败时保存错误，同时把同一个错误返回给调用方，
//! 调用方可以读 Hook 状态，也可以就地处理错误。
//!
//! 不做重试、防抖或取消。
//!
//! # Example
//!
//! ```rust,ignore
//! let service = product_service.clone();
//! let create = use_mutation(move |input: NewProduct| {
//!     let service = service.clone();
//!     async move { service.create_product(input).await }
//! });
//!
//! match create.mutate(NewProduct::new("B", 9.9)).await {
//!     Ok(product) => println!("created {}", product.id),
//!     Err(e) => eprintln!("create failed: {e}"),
//! }
//! ```

use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::ports::HttpError;

use super::state::{RequestState, StateCell};

/// 被包装的异步操作
pub type MutationFn<A, T> =
    Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, HttpError>> + Send + Sync>;

/// 写操作 Hook
///
/// 操作本身以 `Arc` 持有，所有调用与所有克隆句柄共享同一个函数
pub struct MutationHook<A, T> {
    operation: MutationFn<A, T>,
    cell: Arc<StateCell<T>>,
}

impl<A, T> Clone for MutationHook<A, T> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            cell: self.cell.clone(),
        }
    }
}

impl<A, T> MutationHook<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        Self {
            operation: Arc::new(move |args| operation(args).boxed()),
            cell: Arc::new(StateCell::new()),
        }
    }

    /// 原样转发参数并执行操作
    pub async fn mutate(&self, args: A) -> Result<T, HttpError> {
        let generation = self.cell.begin();
        tracing::debug!(generation, "Mutation started");

        let result = (self.operation)(args).await;

        match &result {
            Ok(_) => tracing::debug!(generation, "Mutation succeeded"),
            Err(e) => tracing::warn!(generation, error = %e, "Mutation failed"),
        }

        if !self.cell.finish(generation, result.clone()) {
            tracing::debug!(
                generation,
                latest = self.cell.generation(),
                "Mutation superseded, state left untouched"
            );
        }

        result
    }

    /// 当前状态快照
    pub fn state(&self) -> RequestState<T> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.cell.subscribe()
    }

    /// 回到初始状态
    pub fn reset(&self) {
        self.cell.reset();
    }
}

/// 创建写操作 Hook
pub fn use_mutation<A, T, F, Fut>(operation: F) -> MutationHook<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
{
    MutationHook::new(operation)
}

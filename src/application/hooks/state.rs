//! Request State - Hook 的三态请求状态
//!
//! 状态保存在 `tokio::sync::watch` 通道中，订阅者可以观察每一次状态迁移。
//! 每次调用都会领取一个递增的 generation，只有最新一代的结果才能写回状态。

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::application::ports::HttpError;

/// 请求状态
///
/// 不变量:
/// - `loading` 只在调用开始到完成（成功或失败）之间为 true
/// - 新调用开始时清空 `error`
/// - 失败时保留之前的 `data`
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<HttpError>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> RequestState<T> {
    /// 返回数据（如果有）
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// 从未发起过请求，或已被 reset
    pub fn is_idle(&self) -> bool {
        !self.loading && self.data.is_none() && self.error.is_none()
    }
}

/// Hook 内部的状态单元
pub(crate) struct StateCell<T> {
    tx: watch::Sender<RequestState<T>>,
    generation: AtomicU64,
}

impl<T> StateCell<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(RequestState::default());
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> RequestState<T>
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 开始一次调用：loading=true，error 清空，返回本次的 generation
    ///
    /// generation 的递增与状态写入在同一把写锁内完成
    pub(crate) fn begin(&self) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.error = None;
        });
        generation
    }

    /// 与 `begin` 相同，但先在同一把写锁内执行 `prepare`
    ///
    /// `prepare` 返回 None 时不开始调用，状态与 generation 都不变
    pub(crate) fn begin_with<R>(&self, prepare: impl FnOnce() -> Option<R>) -> Option<(u64, R)> {
        let mut started = None;
        self.tx.send_if_modified(|state| {
            let Some(prepared) = prepare() else {
                return false;
            };
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.error = None;
            started = Some((generation, prepared));
            true
        });
        started
    }

    /// 写回调用结果；generation 已过期时丢弃并返回 false
    pub(crate) fn finish(&self, generation: u64, result: Result<T, HttpError>) -> bool {
        let mut result = Some(result);
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match result.take() {
                Some(Ok(data)) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Some(Err(err)) => state.error = Some(err),
                None => return false,
            }
            state.loading = false;
            true
        })
    }

    /// 让所有进行中的调用过期，并结束 loading
    pub(crate) fn supersede(&self) {
        self.tx.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }

    /// 回到初始状态，进行中的调用同样过期
    pub(crate) fn reset(&self) {
        self.tx.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = RequestState::default();
        });
    }
}

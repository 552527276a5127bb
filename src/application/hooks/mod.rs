//! Hooks - 通用的数据拉取 / 写操作绑定
//!
//! - [`use_api`]: 按 locator 自动拉取，locator/options 变化时重新拉取
//! - [`use_mutation`]: 显式触发的写操作
//!
//! 两者都维护同样的三态 [`RequestState`]，并用 generation 丢弃过期结果。

mod state;
mod use_api;
mod use_mutation;

pub use state::RequestState;
pub use use_api::{use_api, ApiHook, FetchOptions};
pub use use_mutation::{use_mutation, MutationFn, MutationHook};

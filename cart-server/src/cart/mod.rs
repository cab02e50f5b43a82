//! 购物车模块 - 存储后端与变更模型
//!
//! - [`CartStore`] - 存储句柄 (键格式、TTL、条件写入)
//! - [`RedisBackend`] / [`MemoryBackend`] - 可插拔存储后端
//! - [`mutation`] - 对文档的纯内存变更

pub mod memory;
pub mod mutation;
pub mod redis;
pub mod store;

pub use memory::MemoryBackend;
// self:: 消除与 redis crate 的同名歧义
pub use self::redis::RedisBackend;
pub use store::{CartBackend, CartRecord, CartStore, StoreError, cart_key};

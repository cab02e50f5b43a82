//! 购物车存储层
//!
//! # 存储格式
//!
//! | 键 | 值 | 过期 |
//! |----|----|------|
//! | `cart:{userId}` | JSON 序列化的 [`Cart`] | `CART_TTL` 秒，每次写入重置 |
//!
//! # 条件写入
//!
//! 每次保存都带上读取时的原始序列化文档作为 ETag：仅当存储中的值仍与
//! 之相等时写入才生效 (新建购物车要求键不存在)。写入失败即发生了并发
//! 变更，调用方重新读取后重放变更。
//!
//! ```text
//!         ┌────────────────────┐
//!         │  CartBackend Trait │  ◄── 可插拔接口
//!         └────────┬───────────┘
//!                  │
//!         ┌────────┴────────┐
//!         ▼                 ▼
//!   RedisBackend      MemoryBackend
//!   (Redis 存储)      (同进程，测试)
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use shared::models::Cart;

/// 存储键格式: `cart:{userId}`
pub fn cart_key(user_id: &str) -> String {
    format!("cart:{}", user_id)
}

/// 存储层错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("后端不可用: {0}")]
    Unavailable(String),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("后端错误: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// 读取到的购物车文档及其原始序列化形式
///
/// `etag` 即读取时的原始 JSON，作为条件写入的比较值。
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub cart: Cart,
    pub etag: String,
}

/// 存储后端特征
///
/// 所有后端实现必须支持按键读写和条件写入。
#[async_trait]
pub trait CartBackend: Send + Sync + std::fmt::Debug {
    /// 读取键的当前值
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 条件写入：仅当存储值仍等于 `expected` 时写入 (`None` 表示键必须
    /// 不存在)。返回 `false` 表示发生并发修改，未写入。
    async fn put_if(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// 删除键 (键不存在时也成功)
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// 健康检查
    async fn ping(&self) -> Result<(), StoreError>;
}

/// 购物车存储句柄
///
/// 显式构造并通过 [`crate::core::ServerState`] 注入，不使用全局单例。
#[derive(Debug, Clone)]
pub struct CartStore {
    backend: Arc<dyn CartBackend>,
    ttl: Duration,
}

impl CartStore {
    pub fn new(backend: Arc<dyn CartBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// 读取用户的购物车文档
    pub async fn load(&self, user_id: &str) -> Result<Option<CartRecord>, StoreError> {
        match self.backend.get(&cart_key(user_id)).await? {
            Some(raw) => {
                let cart: Cart = serde_json::from_str(&raw)?;
                Ok(Some(CartRecord { cart, etag: raw }))
            }
            None => Ok(None),
        }
    }

    /// 条件保存，TTL 重置
    ///
    /// `expected` 为变更所基于的 [`CartRecord::etag`] (新建购物车传
    /// `None`)。返回 `false` 表示并发冲突，未写入。
    pub async fn save_if(&self, cart: &Cart, expected: Option<&str>) -> Result<bool, StoreError> {
        let raw = serde_json::to_string(cart)?;
        self.backend
            .put_if(&cart_key(&cart.user_id), expected, &raw, self.ttl)
            .await
    }

    /// 删除用户的购物车文档 (幂等)
    pub async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.backend.delete(&cart_key(user_id)).await
    }

    /// 后端健康检查
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }

    /// 配置的 TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

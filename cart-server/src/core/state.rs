use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::cart::{CartStore, MemoryBackend, RedisBackend};
use crate::core::Config;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是购物车服务的核心数据结构，使用 Arc 实现浅拷贝，
/// 克隆成本极低。存储句柄显式构造后注入，不使用模块级单例。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | cart_store | CartStore | 购物车存储句柄 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 购物车存储句柄
    pub cart_store: CartStore,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(config: Config, cart_store: CartStore, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            cart_store,
            jwt_service,
        }
    }

    /// 初始化服务器状态：连接 Redis 并构建各服务
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        tracing::info!(redis_url = %config.redis_url, "Connecting to cart store...");
        let backend = RedisBackend::connect(&config.redis_url).await?;
        let cart_store = CartStore::new(
            Arc::new(backend),
            Duration::from_secs(config.cart_ttl_secs),
        );

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), cart_store, jwt_service))
    }

    /// 构建内存后端状态 (测试与本地开发)
    pub fn in_memory(config: &Config) -> Self {
        let cart_store = CartStore::new(
            Arc::new(MemoryBackend::new()),
            Duration::from_secs(config.cart_ttl_secs),
        );
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self::new(config.clone(), cart_store, jwt_service)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}

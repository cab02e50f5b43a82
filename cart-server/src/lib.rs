//! Storefront Cart Server - 购物车微服务
//!
//! # 架构概述
//!
//! 本模块是购物车服务的主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT 认证网关，验证 Bearer 令牌并注入用户身份
//! - **购物车存储** (`cart`): Redis 键值存储 (`cart:{userId}`)，带 TTL 与条件写入
//! - **HTTP API** (`api`): RESTful 购物车接口 (读取/添加/更新/移除/清空)
//!
//! # 模块结构
//!
//! ```text
//! cart-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── cart/          # 存储后端与变更模型
//! ├── api/           # HTTP 路由和处理器
//! ├── routes.rs      # 路由组装与中间件栈
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cart::{CartStore, MemoryBackend, RedisBackend};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), None, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
   ______           __
  / ____/___ ______/ /_
 / /   / __ `/ ___/ __/
/ /___/ /_/ / /  / /_
\____/\__,_/_/   \__/
    "#
    );
}

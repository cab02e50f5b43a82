use crate::auth::JwtConfig;

/// 服务器配置 - 购物车服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8082 | HTTP 服务端口 |
/// | REDIS_URL | redis://127.0.0.1:6379 | 存储后端地址 |
/// | CART_TTL | 86400 | 购物车过期时间 (秒，每次写入重置) |
/// | ENVIRONMENT | development | 运行环境 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时 (毫秒) |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 CART_TTL=3600 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 存储后端连接地址
    pub redis_url: String,
    /// 购物车 TTL (秒)，每次写入重置
    pub cart_ttl_secs: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8082),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            cart_ttl_secs: std::env::var("CART_TTL")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86400),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(http_port: u16, cart_ttl_secs: u64) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config.cart_ttl_secs = cart_ttl_secs;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::with_overrides(0, 60);
        assert_eq!(config.http_port, 0);
        assert_eq!(config.cart_ttl_secs, 60);
        assert!(!config.redis_url.is_empty());
    }

    #[test]
    fn test_environment_flags() {
        let mut config = Config::with_overrides(0, 60);
        config.environment = "production".to_string();
        assert!(config.is_production());
        assert!(!config.is_development());

        config.environment = "development".to_string();
        assert!(config.is_development());
    }
}

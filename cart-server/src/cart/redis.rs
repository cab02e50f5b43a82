//! Redis 存储后端
//!
//! 使用 `ConnectionManager` 维持到 Redis 的长连接 (断线自动重连)。
//! 条件写入通过 Lua 脚本实现：GET-比较-SET 在服务端原子执行。

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, Script};

use super::store::{CartBackend, StoreError};

/// 比较并写入：存储值仍等于 ARGV[1] 时以新值覆盖并重置 TTL
///
/// 购物车文档恒为非空 JSON，空字符串不会作为合法存储值出现。
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'EX', tonumber(ARGV[3]))
    return 1
end
return 0
"#;

/// 建连超时 (毫秒)
const CONNECT_TIMEOUT_MS: u64 = 2000;

/// Redis 后端
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    cas_script: Script,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend").finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// 连接到 Redis
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS));

        let client =
            Client::open(redis_url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn,
            cas_script: Script::new(CAS_SCRIPT),
        })
    }
}

#[async_trait]
impl CartBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put_if(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);

        match expected {
            // 新建：SET NX，键已存在则冲突
            None => {
                let reply: Option<String> = redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(ttl_secs)
                    .arg("NX")
                    .query_async(&mut conn)
                    .await?;
                Ok(reply.is_some())
            }
            // 覆盖：服务端比较后写入
            Some(expected) => {
                let applied: i64 = self
                    .cas_script
                    .key(key)
                    .arg(expected)
                    .arg(value)
                    .arg(ttl_secs)
                    .invoke_async(&mut conn)
                    .await?;
                Ok(applied == 1)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Backend(format!("unexpected PING reply: {}", reply)))
        }
    }
}

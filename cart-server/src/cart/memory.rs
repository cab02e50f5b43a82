//! 内存存储后端 (同进程)
//!
//! 与 Redis 后端语义一致的进程内实现，用于测试和本地开发，无外部依赖。
//! 过期采用读取时惰性清理。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::store::{CartBackend, StoreError};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// 内存后端
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取未过期的条目，过期条目顺手移除
    fn live_entry(
        entries: &mut HashMap<String, MemoryEntry>,
        key: &str,
    ) -> Option<MemoryEntry> {
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, MemoryEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))
    }
}

#[async_trait]
impl CartBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.lock()?;
        Ok(Self::live_entry(&mut entries, key).map(|e| e.value))
    }

    async fn put_if(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        let current = Self::live_entry(&mut entries, key);

        let matches = match (expected, &current) {
            (None, None) => true,
            (Some(expected), Some(entry)) => entry.value == expected,
            _ => false,
        };

        if matches {
            entries.insert(
                key.to_string(),
                MemoryEntry {
                    value: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }

        Ok(matches)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_get_missing_key() {
        let backend = MemoryBackend::new();
        assert!(backend.get("cart:u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let backend = MemoryBackend::new();

        let written = backend.put_if("cart:u1", None, "{\"v\":1}", TTL).await.unwrap();
        assert!(written);

        let value = backend.get("cart:u1").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"v\":1}"));
    }

    #[tokio::test]
    async fn test_create_conflicts_when_key_exists() {
        let backend = MemoryBackend::new();

        assert!(backend.put_if("cart:u1", None, "a", TTL).await.unwrap());
        // 第二次 NX 写入必须失败
        assert!(!backend.put_if("cart:u1", None, "b", TTL).await.unwrap());
        assert_eq!(backend.get("cart:u1").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_cas_succeeds_on_matching_value() {
        let backend = MemoryBackend::new();

        assert!(backend.put_if("cart:u1", None, "a", TTL).await.unwrap());
        assert!(backend.put_if("cart:u1", Some("a"), "b", TTL).await.unwrap());
        assert_eq!(backend.get("cart:u1").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_cas_fails_on_stale_value() {
        let backend = MemoryBackend::new();

        assert!(backend.put_if("cart:u1", None, "a", TTL).await.unwrap());
        assert!(backend.put_if("cart:u1", Some("a"), "b", TTL).await.unwrap());

        // 基于已被覆盖的旧值写入 → 冲突
        assert!(!backend.put_if("cart:u1", Some("a"), "c", TTL).await.unwrap());
        assert_eq!(backend.get("cart:u1").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_cas_fails_when_key_deleted() {
        let backend = MemoryBackend::new();

        assert!(backend.put_if("cart:u1", None, "a", TTL).await.unwrap());
        backend.delete("cart:u1").await.unwrap();

        assert!(!backend.put_if("cart:u1", Some("a"), "b", TTL).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.delete("cart:u1").await.unwrap();
        backend.delete("cart:u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let backend = MemoryBackend::new();

        assert!(
            backend
                .put_if("cart:u1", None, "a", Duration::from_millis(0))
                .await
                .unwrap()
        );

        assert!(backend.get("cart:u1").await.unwrap().is_none());
        // 过期后键视为不存在，NX 写入应当成功
        assert!(backend.put_if("cart:u1", None, "b", TTL).await.unwrap());
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::TranscriptError;

/// Default entry lifetime: one hour.
pub const DEFAULT_CACHE_TTL_MS: i64 = 3_600_000;

/// Pluggable key-value cache with TTL semantics. Expiry is absolute at write
/// time (`now + ttl`), not sliding; a zero or negative TTL writes an entry
/// that is already expired. Expired entries are evicted lazily on `get`.
#[async_trait]
pub trait CacheStrategy: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl: Option<i64>) -> Result<(), TranscriptError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    expires: i64,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Process-local cache backed by a `HashMap`. Memory is bounded by the live
/// key count plus expired entries not yet read back.
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: i64,
}

impl InMemoryCache {
    pub fn new(default_ttl: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_MS)
    }
}

#[async_trait]
impl CacheStrategy for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            if entry.expires > now_ms() {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<i64>) -> Result<(), TranscriptError> {
        let entry = CacheEntry {
            value: value.to_string(),
            expires: now_ms() + ttl.unwrap_or(self.default_ttl),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// Filesystem cache: one JSON file per key, `{"value": ..., "expires": ms}`.
/// The key is used verbatim as the filename, so callers must hand in
/// filesystem-safe keys. Expired or unparsable files are deleted on read and
/// reported as a miss, never as an error.
pub struct FsCache {
    dir: PathBuf,
    default_ttl: i64,
}

impl FsCache {
    /// Creates the cache directory eagerly.
    pub fn new(dir: impl Into<PathBuf>, default_ttl: i64) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, default_ttl })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl CacheStrategy for FsCache {
    async fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let data = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str::<CacheEntry>(&data) {
            Ok(entry) if entry.expires > now_ms() => {
                debug!("Cache hit: {}", path.display());
                Some(entry.value)
            }
            Ok(_) => {
                debug!("Cache expired: {}", path.display());
                let _ = tokio::fs::remove_file(&path).await;
                None
            }
            Err(e) => {
                // Corrupt or foreign file contents count as a miss.
                debug!("Discarding unreadable cache file {}: {e}", path.display());
                let _ = tokio::fs::remove_file(&path).await;
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<i64>) -> Result<(), TranscriptError> {
        let path = self.entry_path(key);
        let entry = CacheEntry {
            value: value.to_string(),
            expires: now_ms() + ttl.unwrap_or(self.default_ttl),
        };
        let data = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        tokio::fs::write(&path, data).await?;
        debug!("Cached entry: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let cache = InMemoryCache::default();
        cache.set("k", "v", None).await.unwrap();
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_memory_missing_key() {
        let cache = InMemoryCache::default();
        assert_eq!(cache.get("nope").await, None);
    }

    #[tokio::test]
    async fn test_memory_negative_ttl_is_expired() {
        let cache = InMemoryCache::default();
        cache.set("k", "v", Some(-1000)).await.unwrap();
        assert_eq!(cache.get("k").await, None);
        // The entry is purged, not resurrected.
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_memory_ttl_boundary() {
        let cache = InMemoryCache::default();
        cache.set("k", "v", Some(1000)).await.unwrap();
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), DEFAULT_CACHE_TTL_MS).unwrap();
        cache.set("transcript-key", "payload", None).await.unwrap();
        assert_eq!(cache.get("transcript-key").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_fs_negative_ttl_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), DEFAULT_CACHE_TTL_MS).unwrap();
        cache.set("k", "v", Some(-1000)).await.unwrap();
        assert_eq!(cache.get("k").await, None);
        assert!(!dir.path().join("k").exists());
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_fs_ttl_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), DEFAULT_CACHE_TTL_MS).unwrap();
        cache.set("k", "v", Some(1000)).await.unwrap();
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_fs_garbage_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), DEFAULT_CACHE_TTL_MS).unwrap();
        std::fs::write(dir.path().join("k"), "not json at all {{{").unwrap();
        assert_eq!(cache.get("k").await, None);
        assert!(!dir.path().join("k").exists());
    }

    #[tokio::test]
    async fn test_fs_creates_directory_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let _cache = FsCache::new(&nested, DEFAULT_CACHE_TTL_MS).unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_fs_on_disk_format() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), DEFAULT_CACHE_TTL_MS).unwrap();
        cache.set("k", "hello", None).await.unwrap();
        let raw = std::fs::read_to_string(dir.path().join("k")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["value"], "hello");
        assert!(parsed["expires"].is_i64());
    }
}

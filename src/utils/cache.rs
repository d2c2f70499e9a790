use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use axum::body::Bytes;
use tokio::time::Instant;

use crate::core::constants::CACHE_MAX_ENTRIES;

/// 进程内响应缓存：按 URL 缓存 JSON 响应体。
///
/// - 条目在 `duration` 内有效，过期条目不会主动删除，下次回源后原地覆盖。
/// - 最多 `capacity` 个 key，超出时淘汰**最早插入**的 key（FIFO，不是 LRU：读取不会刷新位置，
///   对已有 key 重新写入也保留它原来的位置）。
///
/// 每个服务实例持有自己的 `ResponseCache`（通过 `Arc` 共享给中间件），
/// `clear` 清空，drop 即释放。
pub struct ResponseCache {
    duration: Duration,
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

struct CacheEntry {
    data: Bytes,
    timestamp: Instant,
}

impl ResponseCache {
    pub fn new(duration: Duration) -> Self {
        Self::with_capacity(duration, CACHE_MAX_ENTRIES)
    }

    pub fn with_capacity(duration: Duration, capacity: usize) -> Self {
        Self {
            duration,
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    // 临界区里没有 await，也不会 panic；即便锁被毒化，数据本身仍然一致
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 命中且未过期时返回缓存的响应体。
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        if entry.timestamp.elapsed() < self.duration {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: String, data: Bytes) {
        let mut inner = self.lock();
        let entry = CacheEntry {
            data,
            timestamp: Instant::now(),
        };

        if inner.entries.insert(key.clone(), entry).is_none() {
            inner.order.push_back(key);
        }

        while inner.entries.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            tracing::debug!("🗑️ Cache evicted: {}", oldest);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }
}

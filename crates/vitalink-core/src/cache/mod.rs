//! Time-boxed memoization of AI chat responses
//!
//! Keys are a deterministic digest over the ordered message list, so two
//! logically identical requests always collide. Capacity is bounded with
//! oldest-inserted eviction; recency is deliberately ignored since chat
//! requests are rarely re-issued long after their first answer.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::llm::messages::ChatMessage;

/// One cached completed response
#[derive(Debug, Clone)]
struct CacheEntry {
    response: String,
    created_at: Instant,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest at the front
    order: VecDeque<String>,
}

/// Bounded TTL cache for completed chat responses
#[derive(Debug)]
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    /// Create a cache with the given TTL and capacity
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Deterministic key over the ordered (role, content) tuples.
    ///
    /// Uses SHA-256 so the key survives process restarts and is stable across
    /// platforms, unlike the std hasher.
    pub fn cache_key(messages: &[ChatMessage]) -> String {
        let mut hasher = Sha256::new();
        for message in messages {
            hasher.update(message.role.as_str().as_bytes());
            hasher.update([0x1f]);
            hasher.update(message.content.as_bytes());
            hasher.update([0x1e]);
        }
        let digest = hasher.finalize();
        let mut key = String::with_capacity(digest.len() * 2);
        for byte in digest {
            key.push_str(&format!("{:02x}", byte));
        }
        key
    }

    /// Look up a response; expired entries are purged and treated as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            Some(entry) => {
                if entry.created_at.elapsed() <= self.ttl {
                    return Some(entry.response.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
        }
        None
    }

    /// Insert or overwrite. Exceeding capacity evicts the single
    /// oldest-inserted entry.
    pub fn put(&self, key: impl Into<String>, response: impl Into<String>) {
        let key = key.into();
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        }
        inner.entries.insert(
            key.clone(),
            CacheEntry {
                response: response.into(),
                created_at: Instant::now(),
            },
        );
        inner.order.push_back(key);

        if inner.entries.len() > self.max_entries {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest cache entry");
            }
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of entries currently held (including not-yet-purged expired ones)
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

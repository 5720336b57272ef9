use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::models::ChatRequest;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CAPACITY: usize = 1000;

// only the tail of the conversation goes into the key
const KEY_MESSAGES: usize = 3;
const KEY_CONTENT_CHARS: usize = 50;

// Cache entry with timestamp
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub response: String,
    pub created_at: Instant,
}

// Create a cache key from provider, mode, model, sampling settings and the
// truncated tail of the conversation. Requests whose tails agree on the first
// 50 chars of each of the last 3 messages share a key.
pub fn make_cache_key(req: &ChatRequest) -> String {
    let start = req.messages.len().saturating_sub(KEY_MESSAGES);
    let tail: Vec<String> = req.messages[start..]
        .iter()
        .map(|m| {
            let head: String = m.content.chars().take(KEY_CONTENT_CHARS).collect();
            format!("{}:{}", m.role.as_str(), head)
        })
        .collect();

    let descriptor = format!(
        "{}|{}|{}|{}|{}|{}",
        req.provider,
        req.mode.as_str(),
        req.model.as_deref().unwrap_or("default"),
        req.temperature,
        req.max_tokens,
        tail.join("|")
    );

    let mut hasher = Sha256::new();
    hasher.update(descriptor.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Process-wide response cache. Created at startup, only emptied by restart.
// No single-flight: two concurrent misses on one key both go upstream and the
// later `put` wins.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&self, key: String, response: String) {
        self.put_at(key, response, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) <= self.ttl
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        // clone out before touching the map again; holding the ref while
        // removing would deadlock the shard
        let entry = self.entries.get(key).map(|e| e.value().clone())?;

        if self.is_fresh(&entry, now) {
            return Some(entry.response);
        }

        self.entries
            .remove_if(key, |_, e| !self.is_fresh(e, now));
        tracing::debug!(key, "evicted expired cache entry");
        None
    }

    pub(crate) fn put_at(&self, key: String, response: String, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                response,
                created_at: now,
            },
        );

        if self.entries.len() > self.capacity {
            self.sweep(now);
        }
    }

    // time-based only; fresh entries survive even over capacity
    fn sweep(&self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, e| self.is_fresh(e, now));
        tracing::info!(
            before,
            after = self.entries.len(),
            "swept expired cache entries"
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

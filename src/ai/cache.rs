//! Suggestion cache
//!
//! Bounded, time-expiring store mapping a prompt to a previously fetched
//! suggestion. Capacity pressure evicts the oldest-inserted entry first;
//! expiry is enforced lazily at read time.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct CacheEntry {
    suggestion: String,
    inserted_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order; front is evicted first
    order: VecDeque<String>,
}

/// Bounded TTL cache for suggestions, shared across fetch invocations.
///
/// Cloning is cheap and clones share the same underlying store. All
/// mutation happens under a single mutex, so readers never observe a
/// partially written entry.
#[derive(Clone)]
pub struct SuggestionCache {
    max_size: usize,
    ttl: Duration,
    inner: Arc<Mutex<CacheInner>>,
}

impl SuggestionCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size,
            ttl,
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Returns the cached suggestion for `prompt` if present and not expired.
    ///
    /// Expired entries are removed on the way out; the caller cannot
    /// distinguish "absent" from "expired".
    pub fn get(&self, prompt: &str) -> Option<String> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let expired = match inner.entries.get(prompt) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.suggestion.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(prompt);
            inner.order.retain(|key| key != prompt);
        }
        None
    }

    /// Inserts or overwrites the suggestion for `prompt`.
    ///
    /// Overwriting refreshes both the entry's age and its place in the
    /// eviction order. At capacity, the oldest-inserted entry is evicted
    /// before the new one goes in.
    pub fn set(&self, prompt: &str, suggestion: &str) {
        if self.max_size == 0 {
            return;
        }

        let mut inner = self.inner.lock().expect("cache lock poisoned");

        if inner.entries.contains_key(prompt) {
            inner.order.retain(|key| key != prompt);
        } else {
            while inner.entries.len() >= self.max_size {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push_back(prompt.to_string());
        inner.entries.insert(
            prompt.to_string(),
            CacheEntry {
                suggestion: suggestion.to_string(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of resident entries, expired or not.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SuggestionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionCache")
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

//! Read-through cache with a fixed time-to-live per entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    /// Bumped under the write lock by every invalidation.
    generation: AtomicU64,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Returns the cached value for `key`, computing and storing it if the
    /// entry is missing or older than `ttl`.
    ///
    /// The lock is not held while `compute` runs, so concurrent misses may
    /// compute the same value more than once. A value computed across an
    /// invalidation is returned but not stored.
    ///
    /// ## Errors
    /// Returns whatever `compute` fails with; failures are not cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(entry) = self.entries.read().await.get(&key)
            && Instant::now() < entry.expires_at
        {
            return Ok(entry.value.clone());
        }

        let started_in = self.generation.load(Ordering::SeqCst);
        let value = compute().await?;

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::SeqCst) != started_in {
            tracing::trace!("Cache invalidated during compute; not storing");
            return Ok(value);
        }
        entries.retain(|_, entry| now < entry.expires_at);
        entries.insert(
            key,
            Entry {
                value: value.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(value)
    }

    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

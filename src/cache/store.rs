//! Query Cache Module
//!
//! Keyed single-flight cache. Each key owns a watch channel that broadcasts
//! immutable [`CacheEntry`] snapshots; the first request for a key spawns the
//! only fetch for it, later requests subscribe to the same channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, QueryStatus};
use crate::error::{ProjectionError, Result};

/// Shared, immutable view of an entry.
pub type Snapshot<T> = Arc<CacheEntry<T>>;

// == Slot ==
/// Map cell for one key. `id` distinguishes an entry from any later entry
/// created for the same key after invalidation.
struct Slot<T> {
    id: u64,
    tx: Arc<watch::Sender<Snapshot<T>>>,
}

struct Inner<T> {
    slots: HashMap<String, Slot<T>>,
    next_id: u64,
    stats: CacheStats,
}

// == Query Cache ==
/// Single-flight cache of generator results keyed by serialized parameters.
///
/// Cloning yields another handle to the same store.
pub struct QueryCache<T> {
    name: &'static str,
    latency: Duration,
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            latency: self.latency,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    // == Constructor ==
    /// Creates an empty cache whose fetches wait `latency` before running.
    ///
    /// # Arguments
    /// * `name` - Label used in log events
    /// * `latency` - Simulated fetch delay
    pub fn new(name: &'static str, latency: Duration) -> Self {
        Self {
            name,
            latency,
            inner: Arc::new(RwLock::new(Inner {
                slots: HashMap::new(),
                next_id: 0,
                stats: CacheStats::new(),
            })),
        }
    }

    // == Request ==
    /// Subscribes to `key`, starting a fetch only if the key is absent.
    ///
    /// An existing entry is returned whatever its status: pending entries are
    /// joined, settled ones are served as-is. Error entries are not retried;
    /// call [`QueryCache::invalidate`] first.
    pub async fn request<F>(&self, key: impl Into<String>, fetch: F) -> Subscription<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let key = key.into();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(slot) = inner.slots.get(&key) {
            let rx = slot.tx.subscribe();
            let status = rx.borrow().status;
            match status {
                QueryStatus::Pending => {
                    inner.stats.record_join();
                    debug!(cache = self.name, key = %key, "joined in-flight fetch");
                }
                _ => {
                    inner.stats.record_hit();
                    debug!(cache = self.name, key = %key, ?status, "served settled entry");
                }
            }
            return Subscription::new(key, rx);
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let (tx, rx) = watch::channel(Arc::new(CacheEntry::pending(key.clone())));
        let tx = Arc::new(tx);
        inner.slots.insert(
            key.clone(),
            Slot {
                id,
                tx: Arc::clone(&tx),
            },
        );
        inner.stats.record_fetch();
        inner.stats.set_total_entries(inner.slots.len());
        drop(guard);

        info!(cache = self.name, key = %key, "starting fetch");
        self.spawn_fetch(id, key.clone(), tx, fetch);

        Subscription::new(key, rx)
    }

    // == Reject ==
    /// Records `error` for `key` without fetching.
    ///
    /// Used for parameter sets that fail validation. If the key already has
    /// an entry, that entry is returned unchanged and counted as a hit.
    pub async fn reject(&self, key: impl Into<String>, error: ProjectionError) -> Subscription<T> {
        let key = key.into();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(slot) = inner.slots.get(&key) {
            inner.stats.record_hit();
            debug!(cache = self.name, key = %key, "served stored rejection");
            return Subscription::new(key, slot.tx.subscribe());
        }

        inner.stats.record_rejection();
        warn!(cache = self.name, key = %key, error = %error, "rejected request");

        let id = inner.next_id;
        inner.next_id += 1;
        let (tx, rx) = watch::channel(Arc::new(CacheEntry::rejected(key.clone(), &error)));
        inner.slots.insert(
            key.clone(),
            Slot {
                id,
                tx: Arc::new(tx),
            },
        );
        inner.stats.set_total_entries(inner.slots.len());

        Subscription::new(key, rx)
    }

    fn spawn_fetch<F>(&self, id: u64, key: String, tx: Arc<watch::Sender<Snapshot<T>>>, fetch: F)
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let cache = self.clone();
        let latency = self.latency;

        tokio::spawn(async move {
            // Inner task so a panicking generator still settles the entry.
            let work = tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                fetch()
            });
            let outcome = match work.await {
                Ok(outcome) => outcome,
                Err(err) => Err(ProjectionError::Generation(format!(
                    "fetch task failed: {}",
                    err
                ))),
            };
            cache.complete(id, &key, &tx, outcome).await;
        });
    }

    // == Complete ==
    /// Publishes the terminal snapshot to the entry's subscribers.
    ///
    /// The map only keeps the result if slot `id` is still the entry for
    /// `key`; a result for an invalidated entry is dropped from the map.
    async fn complete(
        &self,
        id: u64,
        key: &str,
        tx: &watch::Sender<Snapshot<T>>,
        outcome: Result<T>,
    ) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let settled = Arc::new(tx.borrow().settle(outcome));
        let status = settled.status;
        tx.send_replace(settled);

        let current = inner.slots.get(key).is_some_and(|slot| slot.id == id);
        if current {
            info!(cache = self.name, key = %key, ?status, "fetch settled");
        } else {
            inner.stats.record_late_discard();
            warn!(cache = self.name, key = %key, ?status, "discarded result of superseded entry");
        }
    }

    // == Snapshot ==
    /// Current state of `key`, if present.
    pub async fn snapshot(&self, key: &str) -> Option<Snapshot<T>> {
        let inner = self.inner.read().await;
        inner.slots.get(key).map(|slot| Arc::clone(&*slot.tx.borrow()))
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.slots.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.slots.keys().cloned().collect()
    }

    // == Invalidate ==
    /// Removes `key` so the next request fetches again.
    ///
    /// Returns true if an entry was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.invalidate_matching(|k| k == key).await > 0
    }

    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_matching<P>(&self, predicate: P) -> usize
    where
        P: Fn(&str) -> bool,
    {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let before = inner.slots.len();
        inner.slots.retain(|key, _| !predicate(key));
        let removed = before - inner.slots.len();

        inner.stats.record_invalidations(removed);
        inner.stats.set_total_entries(inner.slots.len());
        if removed > 0 {
            info!(cache = self.name, removed, "invalidated entries");
        }
        removed
    }

    /// Removes all entries.
    pub async fn clear(&self) -> usize {
        self.invalidate_matching(|_| true).await
    }

    // == Garbage Collection ==
    /// Removes settled entries nobody subscribes to that settled at least
    /// `max_age` ago. Pending entries are never collected.
    ///
    /// Returns the number of entries removed.
    pub async fn collect_garbage(&self, max_age: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let now = Utc::now();

        let before = inner.slots.len();
        inner.slots.retain(|_, slot| {
            if slot.tx.receiver_count() > 0 {
                return true;
            }
            let age = slot
                .tx
                .borrow()
                .settled_for(now)
                .and_then(|age| age.to_std().ok());
            !matches!(age, Some(age) if age >= max_age)
        });
        let removed = before - inner.slots.len();

        inner.stats.record_collected(removed);
        inner.stats.set_total_entries(inner.slots.len());
        removed
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.slots.len());
        stats
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.slots.is_empty()
    }
}

// == Subscription ==
/// A listener on one key's entry.
pub struct Subscription<T> {
    key: String,
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T> Subscription<T> {
    fn new(key: String, rx: watch::Receiver<Snapshot<T>>) -> Self {
        Self { key, rx }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Latest snapshot, without waiting.
    pub fn current(&self) -> Snapshot<T> {
        Arc::clone(&*self.rx.borrow())
    }

    /// Waits for the entry to reach Success or Error.
    pub async fn settled(&mut self) -> Result<Snapshot<T>> {
        let entry = self
            .rx
            .wait_for(|entry| entry.is_terminal())
            .await
            .map_err(|_| {
                ProjectionError::Generation(format!("query '{}' dropped before settling", self.key))
            })?;
        Ok(Arc::clone(&*entry))
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot<T>> {
        self.rx.changed().await.map_err(|_| {
            ProjectionError::Generation(format!("query '{}' closed", self.key))
        })?;
        Ok(Arc::clone(&*self.rx.borrow_and_update()))
    }
}

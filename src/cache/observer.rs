//! Query Observer Module
//!
//! A consumer-side handle that follows exactly one key at a time. Switching
//! keys drops the previous subscription, so a slow fetch for a superseded key
//! can land in the cache without ever reaching this observer.

use tracing::debug;

use crate::cache::{Snapshot, Subscription};
use crate::error::{ProjectionError, Result};

pub struct QueryObserver<T> {
    subscription: Option<Subscription<T>>,
}

impl<T> QueryObserver<T> {
    pub fn new() -> Self {
        Self { subscription: None }
    }

    /// Follows `subscription` from now on.
    ///
    /// Returns true if the observed key changed.
    pub fn observe(&mut self, subscription: Subscription<T>) -> bool {
        let switched = self.key() != Some(subscription.key());
        if switched {
            debug!(
                from = self.key().unwrap_or("<none>"),
                to = subscription.key(),
                "observer switched key"
            );
        }
        self.subscription = Some(subscription);
        switched
    }

    /// Stops following any key.
    pub fn detach(&mut self) {
        self.subscription = None;
    }

    pub fn key(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.key())
    }

    /// State of the current key; None before the first `observe`.
    pub fn state(&self) -> Option<Snapshot<T>> {
        self.subscription.as_ref().map(|s| s.current())
    }

    /// Waits for the current key to settle.
    pub async fn settled(&mut self) -> Result<Snapshot<T>> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.settled().await,
            None => Err(ProjectionError::Generation(
                "observer is not following any query".to_string(),
            )),
        }
    }
}

impl<T> Default for QueryObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{QueryCache, QueryStatus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_observer_starts_empty() {
        let mut observer: QueryObserver<u32> = QueryObserver::new();

        assert!(observer.key().is_none());
        assert!(observer.state().is_none());
        assert!(observer.settled().await.is_err());
    }

    #[tokio::test]
    async fn test_switching_key_follows_new_key_only() {
        let cache = QueryCache::new("test", Duration::from_millis(20));
        let mut observer = QueryObserver::new();

        assert!(observer.observe(cache.request("old", || Ok("old")).await));
        assert!(observer.observe(cache.request("new", || Ok("new")).await));

        let state = observer.settled().await.unwrap();
        assert_eq!(state.key, "new");
        assert_eq!(state.value.as_deref(), Some(&"new"));

        // the superseded result is still stored for reuse
        let mut old = cache.request("old", || Ok("again")).await;
        let stored = old.settled().await.unwrap();
        assert_eq!(stored.value.as_deref(), Some(&"old"));
        assert_eq!(observer.key(), Some("new"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_superseded_fetch_lands_after_new_key() {
        let cache = QueryCache::new("test", Duration::ZERO);
        let mut observer = QueryObserver::new();

        observer.observe(
            cache
                .request("old", || {
                    std::thread::sleep(Duration::from_millis(200));
                    Ok("old")
                })
                .await,
        );
        assert!(observer.observe(cache.request("new", || Ok("new")).await));

        let state = observer.settled().await.unwrap();
        assert_eq!(state.value.as_deref(), Some(&"new"));

        // old fetch is still running; joining it waits for its result
        let mut old = cache.request("old", || Ok("again")).await;
        assert_eq!(old.current().status, QueryStatus::Pending);
        let stored = old.settled().await.unwrap();
        assert_eq!(stored.value.as_deref(), Some(&"old"));

        assert_eq!(observer.key(), Some("new"));
        let state = observer.state().unwrap();
        assert_eq!(state.key, "new");
        assert_eq!(state.value.as_deref(), Some(&"new"));
        assert_eq!(cache.stats().await.late_discards, 0);
    }

    #[tokio::test]
    async fn test_observing_same_key_is_not_a_switch() {
        let cache = QueryCache::new("test", Duration::ZERO);
        let mut observer = QueryObserver::new();

        observer.observe(cache.request("a", || Ok(1)).await);
        assert!(!observer.observe(cache.request("a", || Ok(2)).await));

        let state = observer.settled().await.unwrap();
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.value.as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn test_detach() {
        let cache = QueryCache::new("test", Duration::ZERO);
        let mut observer = QueryObserver::new();

        observer.observe(cache.request("a", || Ok(1)).await);
        observer.detach();
        assert!(observer.state().is_none());
    }
}

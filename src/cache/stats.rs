//! Cache Statistics Module
//!
//! Tracks how requests were served: fresh fetches, shared in-flight fetches,
//! settled hits, and removals.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Requests answered by a settled entry
    pub hits: u64,
    /// Requests that attached to a pending fetch
    pub joins: u64,
    /// Fetches started, i.e. generator invocations
    pub fetches: u64,
    /// Requests refused before fetching because of invalid parameters
    pub rejections: u64,
    /// Entries removed by invalidation
    pub invalidations: u64,
    /// Results that arrived after their entry was removed or replaced
    pub late_discards: u64,
    /// Inactive entries removed by garbage collection
    pub collected: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of requests that did not start a fetch.
    ///
    /// Returns (hits + joins) / (hits + joins + fetches), or 0.0 if no
    /// requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.joins;
        let total = served + self.fetches;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_join(&mut self) {
        self.joins += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    pub fn record_late_discard(&mut self) {
        self.late_discards += 1;
    }

    pub fn record_collected(&mut self, count: usize) {
        self.collected += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    /// Sums two snapshots, e.g. across several caches.
    pub fn merge(&self, other: &CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + other.hits,
            joins: self.joins + other.joins,
            fetches: self.fetches + other.fetches,
            rejections: self.rejections + other.rejections,
            invalidations: self.invalidations + other.invalidations,
            late_discards: self.late_discards + other.late_discards,
            collected: self.collected + other.collected,
            total_entries: self.total_entries + other.total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.joins, 0);
        assert_eq!(stats.fetches, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_joins_as_served() {
        let mut stats = CacheStats::new();
        stats.record_fetch();
        stats.record_join();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_hit_rate_all_fetches() {
        let mut stats = CacheStats::new();
        stats.record_fetch();
        stats.record_fetch();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_bulk_counters() {
        let mut stats = CacheStats::new();
        stats.record_invalidations(3);
        stats.record_collected(2);
        stats.record_late_discard();
        assert_eq!(stats.invalidations, 3);
        assert_eq!(stats.collected, 2);
        assert_eq!(stats.late_discards, 1);
    }

    #[test]
    fn test_merge() {
        let mut a = CacheStats::new();
        a.record_fetch();
        a.set_total_entries(2);
        let mut b = CacheStats::new();
        b.record_hit();
        b.set_total_entries(1);

        let merged = a.merge(&b);
        assert_eq!(merged.fetches, 1);
        assert_eq!(merged.hits, 1);
        assert_eq!(merged.total_entries, 3);
    }
}

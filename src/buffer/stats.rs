//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by the buffer manager.
///
/// All fields are atomic, so they can be read without taking the pool lock.
///
/// # Memory Ordering
/// Every access uses `Ordering::Relaxed`: each counter only needs to be
/// atomic on its own, and a snapshot need not be consistent across counters.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Pins satisfied by an already-resident page.
    pub hits: AtomicU64,
    /// Pins that needed a frame (read or install).
    pub misses: AtomicU64,
    /// Resident pages dropped to make room for another page.
    pub evictions: AtomicU64,
    /// Evictions that first had to write a dirty page back.
    pub dirty_evictions: AtomicU64,
    /// Pages read from the page store.
    pub pages_read: AtomicU64,
    /// Pages written to the page store.
    pub pages_written: AtomicU64,
    /// Pages installed straight from a caller buffer.
    pub pages_installed: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Hit rate over all pins (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Non-atomic copy of every counter for display or comparison.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            dirty_evictions: self.dirty_evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_installed: self.pages_installed.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.dirty_evictions,
            &self.pages_read,
            &self.pages_written,
            &self.pages_installed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
///
/// # Example
/// ```
/// use clockpool::BufferPoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferPoolStats::new();
/// stats.hits.fetch_add(3, Ordering::Relaxed);
/// stats.misses.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub dirty_evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_installed: u64,
}

impl StatsSnapshot {
    /// Hit rate over all pins (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {} ({} dirty), reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.evictions,
            self.dirty_evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}

//! Atomic counters for connection outcomes
//!
//! Lock-free counters that can be safely updated from any thread. Every
//! update is mirrored onto the `metrics` facade so a host that installs a
//! recorder gets the same numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-manager connection counters
#[derive(Debug, Default)]
pub struct ConnectionStats {
    pub attempts: AtomicU64,
    pub primary_connects: AtomicU64,
    pub fallback_connects: AtomicU64,
    pub connect_failures: AtomicU64,
    pub precondition_failures: AtomicU64,
    pub rejected_starts: AtomicU64,
    pub teardowns: AtomicU64,
    pub runtime_errors: AtomicU64,
}

impl ConnectionStats {
    pub const fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            primary_connects: AtomicU64::new(0),
            fallback_connects: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            precondition_failures: AtomicU64::new(0),
            rejected_starts: AtomicU64::new(0),
            teardowns: AtomicU64::new(0),
            runtime_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_connect_attempts_total").increment(1);
    }

    #[inline]
    pub fn primary_connected(&self) {
        self.primary_connects.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_connects_total", "transport" => "primary").increment(1);
    }

    #[inline]
    pub fn fallback_connected(&self) {
        self.fallback_connects.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_connects_total", "transport" => "fallback").increment(1);
    }

    #[inline]
    pub fn connect_failed(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_connect_failures_total").increment(1);
    }

    #[inline]
    pub fn precondition_failed(&self) {
        self.precondition_failures.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_precondition_failures_total").increment(1);
    }

    #[inline]
    pub fn start_rejected(&self) {
        self.rejected_starts.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_rejected_starts_total").increment(1);
    }

    #[inline]
    pub fn teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_teardowns_total").increment(1);
    }

    #[inline]
    pub fn runtime_error(&self) {
        self.runtime_errors.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("servicebase_runtime_errors_total").increment(1);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            primary_connects: self.primary_connects.load(Ordering::Relaxed),
            fallback_connects: self.fallback_connects.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            precondition_failures: self.precondition_failures.load(Ordering::Relaxed),
            rejected_starts: self.rejected_starts.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
            runtime_errors: self.runtime_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of counters for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub attempts: u64,
    pub primary_connects: u64,
    pub fallback_connects: u64,
    pub connect_failures: u64,
    pub precondition_failures: u64,
    pub rejected_starts: u64,
    pub teardowns: u64,
    pub runtime_errors: u64,
}

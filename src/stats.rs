// stats.rs - candidate counting for progress reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Thread-safe counter of candidates tested. Reporting only; the search
/// drivers never make control-flow decisions from it.
pub struct Statistics {
    tested: AtomicU64,
    start_time: AtomicU64, // Unix timestamp in seconds
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            tested: AtomicU64::new(0),
            start_time: AtomicU64::new(now_secs()),
        }
    }

    pub fn increment_tested(&self) {
        self.tested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_tested(&self, n: u64) {
        self.tested.fetch_add(n, Ordering::Relaxed);
    }

    pub fn tested(&self) -> u64 {
        self.tested.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> f64 {
        let start = self.start_time.load(Ordering::Relaxed);
        now_secs().saturating_sub(start) as f64
    }

    /// Candidates per second since the run started.
    pub fn rate(&self) -> f64 {
        let tested = self.tested() as f64;
        let elapsed = self.elapsed();
        if elapsed > 0.0 {
            tested / elapsed
        } else {
            tested
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

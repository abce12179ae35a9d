//! In-process metrics behind the `/stats` endpoints
//!
//! All handles are cheap clones sharing one underlying value.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic event count
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Level that rises and falls, e.g. requests in flight
#[derive(Debug, Clone, Default)]
pub struct Gauge(Arc<AtomicU64>);

impl Gauge {
    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

const DEFAULT_WINDOW: usize = 10_000;

/// Distribution over the most recent samples; older ones fall out
#[derive(Debug, Clone)]
pub struct Histogram {
    window: Arc<Mutex<VecDeque<f64>>>,
    capacity: usize,
}

/// Point-in-time view of a histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSummary {
    pub count: usize,
    pub mean: f64,
    pub p50: f64,
    pub p99: f64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }
}

impl Histogram {
    pub fn with_window(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    pub fn record(&self, value: f64) {
        let mut window = self.window.lock();
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    pub fn count(&self) -> usize {
        self.window.lock().len()
    }

    pub fn summary(&self) -> HistogramSummary {
        let mut sorted: Vec<f64> = self.window.lock().iter().copied().collect();
        if sorted.is_empty() {
            return HistogramSummary { count: 0, mean: 0.0, p50: 0.0, p99: 0.0 };
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let rank = |p: f64| {
            let idx = ((sorted.len() as f64) * p / 100.0) as usize;
            sorted[idx.min(sorted.len() - 1)]
        };

        HistogramSummary {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50: rank(50.0),
            p99: rank(99.0),
        }
    }
}

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;
use serde::Serialize;

use super::statistics::{group_statistics, StatsByName};
use super::vitals::{composite_score, Vital};
use super::MetricSample;

// ─── Configuration ───────────────────────────────────────────────

/// Default cap on buffered samples.
pub const DEFAULT_CAPACITY: usize = 1000;

// ─── Public types ────────────────────────────────────────────────

/// Bounded, FIFO-evicting sample buffer.
/// The ingest handler calls `submit()`, queries and the SSE stream read it.
///
/// Each process owns its own store. Several instances behind a load
/// balancer each see only the traffic routed to them.
pub struct MetricsStore {
    capacity: usize,
    inner: Mutex<VecDeque<MetricSample>>,
}

/// Everything a query or stream tick reports, read under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct StoreView {
    pub metrics: Vec<MetricSample>,
    pub statistics: StatsByName,
    pub count: usize,
    /// Composite over the newest buffered sample of each vital
    pub score: u8,
}

// ─── MetricsStore impl ───────────────────────────────────────────

impl MetricsStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    /// Append a single sample, evicting the oldest entries past the cap.
    pub fn submit(&self, sample: MetricSample) {
        let mut buf = self.inner.lock();
        buf.push_back(sample);
        Self::evict(&mut buf, self.capacity);
    }

    /// Append a batch under one lock so readers never observe half of it.
    pub fn submit_all(&self, samples: impl IntoIterator<Item = MetricSample>) {
        let mut buf = self.inner.lock();
        buf.extend(samples);
        Self::evict(&mut buf, self.capacity);
    }

    /// The most recent `limit` samples, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<MetricSample> {
        tail(&self.inner.lock(), limit)
    }

    /// Per-name statistics over the whole buffer.
    pub fn statistics(&self) -> StatsByName {
        stats_of(&self.inner.lock())
    }

    /// Tail, statistics, length and score taken from the same buffer state.
    pub fn view(&self, limit: usize) -> StoreView {
        let buf = self.inner.lock();
        StoreView {
            metrics: tail(&buf, limit),
            statistics: stats_of(&buf),
            count: buf.len(),
            score: composite_score(&latest_of(&buf)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict(buf: &mut VecDeque<MetricSample>, capacity: usize) {
        let excess = buf.len().saturating_sub(capacity);
        if excess > 0 {
            buf.drain(..excess);
        }
    }
}

// ─── Buffer readers (caller holds the lock) ──────────────────────

fn tail(buf: &VecDeque<MetricSample>, limit: usize) -> Vec<MetricSample> {
    let skip = buf.len().saturating_sub(limit);
    buf.iter().skip(skip).cloned().collect()
}

fn stats_of(buf: &VecDeque<MetricSample>) -> StatsByName {
    group_statistics(buf.iter().map(|s| (s.name.as_str(), s.value)))
}

/// Most recent buffered value of each known vital.
fn latest_of(buf: &VecDeque<MetricSample>) -> BTreeMap<Vital, f64> {
    let mut latest = BTreeMap::new();
    for sample in buf.iter().rev() {
        if let Some(vital) = Vital::from_name(&sample.name) {
            latest.entry(vital).or_insert(sample.value);
        }
        if latest.len() == Vital::ALL.len() {
            break;
        }
    }
    latest
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

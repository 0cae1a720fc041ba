//! Page-side collector: turns performance timeline entries into rated
//! metric samples and ships them to the ingest endpoint.
//!
//! The browser surface sits behind two traits so the same logic replays
//! recorded traces and runs in tests: [`PerformanceTimeline`] hands out
//! subscriptions, [`Beacon`] delivers samples.

pub mod beacon;
pub mod entries;
pub mod trace;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::vitals::{composite_score, Vital};
use crate::metrics::{now_ms, MetricSample};

pub use beacon::{Beacon, BeaconError, HttpBeacon};
pub use entries::{EntryType, PerformanceEntry};
pub use trace::{replay, PageTrace, ReplayReport, ReplayTimeline, TraceError};

/// Resources slower than this are logged.
const SLOW_RESOURCE_MS: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum ObserveError {
    #[error("entry type '{0}' is not supported")]
    Unsupported(EntryType),
}

/// Source of performance timeline subscriptions.
pub trait PerformanceTimeline {
    fn subscribe(&mut self, entry_type: EntryType) -> Result<(), ObserveError>;
}

/// Per-page collector state: active subscriptions, the latest value of
/// each vital and the local history of emitted samples.
pub struct Collector<B: Beacon> {
    beacon: B,
    page_url: String,
    started: bool,
    active: BTreeSet<EntryType>,
    latest: BTreeMap<Vital, f64>,
    history: Vec<MetricSample>,
}

impl<B: Beacon> Collector<B> {
    pub fn new(beacon: B, page_url: impl Into<String>) -> Self {
        Self {
            beacon,
            page_url: page_url.into(),
            started: false,
            active: BTreeSet::new(),
            latest: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Subscribes to the vital entry types and, separately, to resource
    /// timing. Calling it again while started does nothing.
    pub fn start_observing<T: PerformanceTimeline>(&mut self, timeline: &mut T) {
        if self.started {
            return;
        }
        self.started = true;

        let wanted = EntryType::VITALS
            .into_iter()
            .chain(std::iter::once(EntryType::Resource));

        for entry_type in wanted {
            match timeline.subscribe(entry_type) {
                Ok(()) => {
                    self.active.insert(entry_type);
                }
                Err(e) => warn!(%entry_type, error = %e, "performance observer not supported"),
            }
        }
    }

    pub fn is_observing(&self, entry_type: EntryType) -> bool {
        self.active.contains(&entry_type)
    }

    /// Processes one timeline entry. Returns the emitted sample, if any.
    pub fn on_entry(&mut self, entry: &PerformanceEntry) -> Option<MetricSample> {
        if !self.active.contains(&entry.entry_type()) {
            return None;
        }

        let (vital, observed) = match entry {
            PerformanceEntry::Navigation {
                request_start,
                response_start,
            } => (Vital::Ttfb, response_start - request_start),
            PerformanceEntry::Paint { name, start_time } => {
                if name != "first-contentful-paint" {
                    return None;
                }
                (Vital::Fcp, *start_time)
            }
            PerformanceEntry::LargestContentfulPaint { start_time } => (Vital::Lcp, *start_time),
            PerformanceEntry::LayoutShift {
                value,
                had_recent_input,
            } => {
                if *had_recent_input {
                    return None;
                }
                (Vital::Cls, *value)
            }
            PerformanceEntry::FirstInput {
                start_time,
                processing_start,
            } => (Vital::Fid, processing_start - start_time),
            PerformanceEntry::Resource {
                name,
                request_start,
                response_end,
            } => {
                let duration = response_end - request_start;
                if duration > SLOW_RESOURCE_MS {
                    warn!(resource = %name, duration_ms = duration, "slow resource detected");
                }
                return None;
            }
        };

        if !observed.is_finite() || observed < 0.0 {
            debug!(%vital, observed, "discarding invalid observation");
            return None;
        }

        let folded = vital
            .reducer()
            .fold(self.latest.get(&vital).copied(), observed)?;
        self.latest.insert(vital, folded);

        let sample = MetricSample::rated(vital.as_str(), folded, now_ms(), self.page_url.clone());
        self.history.push(sample.clone());
        self.send(&sample);
        Some(sample)
    }

    /// Fire-and-forget delivery. Failures are logged and dropped.
    pub fn send(&self, sample: &MetricSample) {
        if let Err(e) = self.beacon.send(sample) {
            warn!(metric = %sample.name, error = %e, "failed to send performance metric");
        }
    }

    /// Composite 0–100 score over the latest value of each vital.
    pub fn score(&self) -> u8 {
        composite_score(&self.latest)
    }

    pub fn latest(&self) -> &BTreeMap<Vital, f64> {
        &self.latest
    }

    pub fn metrics(&self) -> &[MetricSample] {
        &self.history
    }

    /// Drops subscriptions and all local state.
    pub fn destroy(&mut self) {
        self.started = false;
        self.active.clear();
        self.latest.clear();
        self.history.clear();
    }
}

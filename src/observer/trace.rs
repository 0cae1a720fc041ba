//! Recorded page-load traces, replayed through a [`Collector`] as if the
//! entries were arriving from a live timeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{Beacon, Collector, EntryType, ObserveError, PerformanceEntry, PerformanceTimeline};
use crate::metrics::vitals::score_status;
use crate::metrics::{MetricSample, Rating, Vital};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("malformed trace: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTrace {
    Page {
        #[serde(default)]
        url: String,
        entries: Vec<serde_json::Value>,
    },
    Bare(Vec<serde_json::Value>),
}

/// Entries captured from one page load, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTrace {
    pub url: String,
    pub entries: Vec<PerformanceEntry>,
    /// Entries of types the collector never reads (`mark`, `longtask`, ...)
    pub skipped: usize,
}

impl PageTrace {
    /// Accepts `{ "url": .., "entries": [..] }` or a bare
    /// `performance.getEntries()` dump.
    pub fn from_json(raw: &[u8]) -> Result<Self, TraceError> {
        let (url, values) = match serde_json::from_slice(raw)? {
            RawTrace::Page { url, entries } => (url, entries),
            RawTrace::Bare(entries) => (String::new(), entries),
        };

        let mut entries = Vec::with_capacity(values.len());
        let mut skipped = 0;
        for value in values {
            match serde_json::from_value::<PerformanceEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    debug!(error = %e, "skipping trace entry");
                    skipped += 1;
                }
            }
        }

        Ok(Self {
            url,
            entries,
            skipped,
        })
    }
}

/// Timeline backed by a recording. Every subscription succeeds unless the
/// type was marked unsupported, which mimics an older browser.
#[derive(Debug, Default)]
pub struct ReplayTimeline {
    unsupported: BTreeSet<EntryType>,
}

impl ReplayTimeline {
    pub fn without(unsupported: impl IntoIterator<Item = EntryType>) -> Self {
        Self {
            unsupported: unsupported.into_iter().collect(),
        }
    }
}

impl PerformanceTimeline for ReplayTimeline {
    fn subscribe(&mut self, entry_type: EntryType) -> Result<(), ObserveError> {
        if self.unsupported.contains(&entry_type) {
            return Err(ObserveError::Unsupported(entry_type));
        }
        Ok(())
    }
}

/// What one replayed page load produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub url: String,
    pub emitted: Vec<MetricSample>,
    pub latest: BTreeMap<Vital, f64>,
    pub score: u8,
    pub status: Rating,
}

/// Feeds every entry of `trace` through a fresh collector that ships its
/// samples with `beacon`.
pub fn replay<B: Beacon>(trace: &PageTrace, beacon: B, timeline: &mut ReplayTimeline) -> ReplayReport {
    let mut collector = Collector::new(beacon, trace.url.clone());
    collector.start_observing(timeline);

    let emitted: Vec<MetricSample> = trace
        .entries
        .iter()
        .filter_map(|entry| collector.on_entry(entry))
        .collect();

    let score = collector.score();
    ReplayReport {
        url: trace.url.clone(),
        emitted,
        latest: collector.latest().clone(),
        score,
        status: score_status(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::BeaconError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<MetricSample>>>);

    impl Beacon for Captured {
        fn send(&self, sample: &MetricSample) -> Result<(), BeaconError> {
            self.0.borrow_mut().push(sample.clone());
            Ok(())
        }
    }

    const PAGE_LOAD: &str = r#"{
        "url": "https://me.dev/#projects",
        "entries": [
            { "entryType": "navigation", "name": "https://me.dev/", "requestStart": 10, "responseStart": 190 },
            { "entryType": "mark", "name": "hydrated", "startTime": 400 },
            { "entryType": "paint", "name": "first-paint", "startTime": 610 },
            { "entryType": "paint", "name": "first-contentful-paint", "startTime": 640 },
            { "entryType": "largest-contentful-paint", "startTime": 900 },
            { "entryType": "layout-shift", "value": 0.03, "hadRecentInput": false },
            { "entryType": "layout-shift", "value": 0.30, "hadRecentInput": true },
            { "entryType": "largest-contentful-paint", "startTime": 1400 },
            { "entryType": "resource", "name": "/images/hero.webp", "requestStart": 100, "responseEnd": 1600 },
            { "entryType": "first-input", "startTime": 2000, "processingStart": 2030 },
            { "entryType": "first-input", "startTime": 3000, "processingStart": 3400 },
            { "entryType": "longtask", "startTime": 2100, "duration": 90 }
        ]
    }"#;

    #[test]
    fn parses_page_trace_and_skips_foreign_entries() {
        let trace = PageTrace::from_json(PAGE_LOAD.as_bytes()).unwrap();
        assert_eq!(trace.url, "https://me.dev/#projects");
        assert_eq!(trace.entries.len(), 10);
        assert_eq!(trace.skipped, 2);
    }

    #[test]
    fn parses_bare_entry_dump() {
        let trace = PageTrace::from_json(
            br#"[{ "entryType": "largest-contentful-paint", "startTime": 1200 }]"#,
        )
        .unwrap();
        assert!(trace.url.is_empty());
        assert_eq!(trace.entries.len(), 1);
    }

    #[test]
    fn rejects_non_trace_json() {
        assert!(PageTrace::from_json(b"{\"entries\": 3}").is_err());
        assert!(PageTrace::from_json(b"not json").is_err());
    }

    #[test]
    fn replay_runs_entries_through_the_collector() {
        let trace = PageTrace::from_json(PAGE_LOAD.as_bytes()).unwrap();
        let beacon = Captured::default();
        let report = replay(&trace, beacon.clone(), &mut ReplayTimeline::default());

        let names: Vec<&str> = report.emitted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["TTFB", "FCP", "LCP", "CLS", "LCP", "FID"]);
        assert_eq!(beacon.0.borrow().len(), 6);
        assert!(report.emitted.iter().all(|s| s.url == "https://me.dev/#projects"));

        assert_eq!(report.latest[&Vital::Ttfb], 180.0);
        assert_eq!(report.latest[&Vital::Lcp], 1400.0);
        assert_eq!(report.latest[&Vital::Fid], 30.0);
        assert_eq!(report.score, 100);
        assert_eq!(report.status, Rating::Good);
    }

    #[test]
    fn unsupported_types_are_left_out() {
        let trace = PageTrace::from_json(PAGE_LOAD.as_bytes()).unwrap();
        let mut timeline = ReplayTimeline::without([EntryType::LayoutShift, EntryType::FirstInput]);
        let report = replay(&trace, Captured::default(), &mut timeline);

        assert!(!report.latest.contains_key(&Vital::Cls));
        assert!(!report.latest.contains_key(&Vital::Fid));
        assert_eq!(report.emitted.len(), 4);
    }
}

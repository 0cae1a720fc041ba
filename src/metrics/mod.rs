pub mod statistics;
pub mod store;
pub mod stream;
pub mod vitals;

use serde::{Deserialize, Serialize};

pub use statistics::{MetricStatistics, StatsByName};
pub use store::{MetricsStore, StoreView};
pub use vitals::{rate, Rating, Vital};

/// One recorded metric observation.
/// Built once, either by the browser-side collector or on ingest, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// "CLS", "LCP", … or a free-form metric name
    pub name: String,
    /// Finite and ≥ 0; unit depends on `name`
    pub value: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub rating: Rating,
    /// Originating page, informational only
    #[serde(default)]
    pub url: String,
}

impl MetricSample {
    /// Builds a sample rated against the fixed thresholds.
    pub fn rated(name: impl Into<String>, value: f64, timestamp: i64, url: impl Into<String>) -> Self {
        let name = name.into();
        let rating = rate(&name, value);
        Self {
            name,
            value,
            timestamp,
            rating,
            url: url.into(),
        }
    }
}

/// Current wall clock in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

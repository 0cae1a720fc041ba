use std::collections::BTreeMap;

use serde::Serialize;

use super::vitals::Vital;

/// Statistics keyed by metric name. Always carries the five vitals.
pub type StatsByName = BTreeMap<String, MetricStatistics>;

/// Descriptive statistics for one metric name.
/// Serialized straight into the query response and the SSE feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStatistics {
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStatistics {
    /// Computes statistics over an unsorted set of values.
    ///
    /// `median` is the element at `n / 2` of the sorted sequence (no
    /// interpolation for even counts) and `p95` the element at
    /// `floor(n * 0.95)`, clamped to the last index.
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let n = values.len();
        let sum: f64 = values.iter().sum();
        let p95_idx = ((n as f64 * 0.95).floor() as usize).min(n - 1);

        Self {
            count: n,
            average: sum / n as f64,
            median: values[n / 2],
            p95: values[p95_idx],
            min: values[0],
            max: values[n - 1],
        }
    }

    /// All-zero placeholder for a metric with no samples.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: 0.0,
            median: 0.0,
            p95: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Groups `(name, value)` pairs by name and computes statistics per group.
/// The five vitals are always present, zeroed when they have no samples.
pub fn group_statistics<'a, I>(samples: I) -> StatsByName
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = Vital::ALL
        .iter()
        .map(|v| (v.as_str().to_owned(), Vec::new()))
        .collect();

    for (name, value) in samples {
        groups.entry(name.to_owned()).or_default().push(value);
    }

    groups
        .into_iter()
        .map(|(name, values)| (name, MetricStatistics::from_values(values)))
        .collect()
}

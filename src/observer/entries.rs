use std::fmt;

use serde::Deserialize;

/// Performance timeline entry types the collector subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryType {
    Navigation,
    Paint,
    LargestContentfulPaint,
    LayoutShift,
    FirstInput,
    Resource,
}

impl EntryType {
    /// Entry types that feed the Core Web Vitals.
    pub const VITALS: [EntryType; 5] = [
        EntryType::Navigation,
        EntryType::Paint,
        EntryType::LargestContentfulPaint,
        EntryType::LayoutShift,
        EntryType::FirstInput,
    ];

    /// Inverse of [`as_str`](Self::as_str).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::VITALS
            .into_iter()
            .chain([Self::Resource])
            .find(|t| t.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Paint => "paint",
            Self::LargestContentfulPaint => "largest-contentful-paint",
            Self::LayoutShift => "layout-shift",
            Self::FirstInput => "first-input",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a timeline entry that the collector reads.
/// Times are milliseconds relative to navigation start.
///
/// Deserializes from the browser's `toJSON()` shape, tagged by `entryType`;
/// fields the collector does not read are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "entryType", rename_all = "kebab-case")]
pub enum PerformanceEntry {
    #[serde(rename_all = "camelCase")]
    Navigation {
        request_start: f64,
        response_start: f64,
    },
    #[serde(rename_all = "camelCase")]
    Paint {
        name: String,
        start_time: f64,
    },
    #[serde(rename_all = "camelCase")]
    LargestContentfulPaint {
        start_time: f64,
    },
    #[serde(rename_all = "camelCase")]
    LayoutShift {
        value: f64,
        had_recent_input: bool,
    },
    #[serde(rename_all = "camelCase")]
    FirstInput {
        start_time: f64,
        processing_start: f64,
    },
    #[serde(rename_all = "camelCase")]
    Resource {
        name: String,
        request_start: f64,
        response_end: f64,
    },
}

impl PerformanceEntry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Navigation { .. } => EntryType::Navigation,
            Self::Paint { .. } => EntryType::Paint,
            Self::LargestContentfulPaint { .. } => EntryType::LargestContentfulPaint,
            Self::LayoutShift { .. } => EntryType::LayoutShift,
            Self::FirstInput { .. } => EntryType::FirstInput,
            Self::Resource { .. } => EntryType::Resource,
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Vocabulary ──────────────────────────────────────────────────

/// The five Core Web Vitals tracked end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Vital {
    #[serde(rename = "CLS")]
    Cls,
    #[serde(rename = "FID")]
    Fid,
    #[serde(rename = "FCP")]
    Fcp,
    #[serde(rename = "LCP")]
    Lcp,
    #[serde(rename = "TTFB")]
    Ttfb,
}

/// Good / needs-improvement / poor classification of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

/// Upper bounds for the good and needs-improvement bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub poor: f64,
}

/// How a new observation folds into the latest known value of a vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Later observations supersede earlier ones.
    Replace,
    /// Observations accumulate into a running total.
    Sum,
    /// Only the first observation counts; later ones are ignored.
    KeepFirst,
}

impl Reducer {
    /// Folds `next` into `current`. `None` means the observation is discarded.
    pub fn fold(self, current: Option<f64>, next: f64) -> Option<f64> {
        match (self, current) {
            (Self::Replace, _) => Some(next),
            (Self::Sum, Some(total)) => Some(total + next),
            (Self::Sum, None) => Some(next),
            (Self::KeepFirst, Some(_)) => None,
            (Self::KeepFirst, None) => Some(next),
        }
    }
}

impl Vital {
    pub const ALL: [Vital; 5] = [Vital::Cls, Vital::Fid, Vital::Fcp, Vital::Lcp, Vital::Ttfb];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cls => "CLS",
            Self::Fid => "FID",
            Self::Fcp => "FCP",
            Self::Lcp => "LCP",
            Self::Ttfb => "TTFB",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }

    pub fn thresholds(self) -> Thresholds {
        let (good, poor) = match self {
            Self::Cls => (0.10, 0.25),
            Self::Fid => (100.0, 300.0),
            Self::Fcp => (1800.0, 3000.0),
            Self::Lcp => (2500.0, 4000.0),
            Self::Ttfb => (800.0, 1800.0),
        };
        Thresholds { good, poor }
    }

    pub fn reducer(self) -> Reducer {
        match self {
            Self::Cls => Reducer::Sum,
            Self::Fid => Reducer::KeepFirst,
            Self::Fcp | Self::Lcp | Self::Ttfb => Reducer::Replace,
        }
    }

    /// Share of the composite score. Weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Self::Lcp | Self::Cls => 0.25,
            Self::Fid => 0.20,
            Self::Fcp | Self::Ttfb => 0.15,
        }
    }

    pub fn rate(self, value: f64) -> Rating {
        let t = self.thresholds();
        if value <= t.good {
            Rating::Good
        } else if value <= t.poor {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }

    /// 100 at or below the good bound, 0 at or above the poor bound,
    /// linear in between.
    pub fn contribution(self, value: f64) -> f64 {
        let t = self.thresholds();
        if value <= t.good {
            100.0
        } else if value >= t.poor {
            0.0
        } else {
            100.0 * (t.poor - value) / (t.poor - t.good)
        }
    }
}

impl fmt::Display for Vital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::NeedsImprovement => "needs-improvement",
            Self::Poor => "poor",
        })
    }
}

/// Rates a metric by name. Names outside the known vitals rate `Good`.
pub fn rate(name: &str, value: f64) -> Rating {
    Vital::from_name(name)
        .map(|v| v.rate(value))
        .unwrap_or(Rating::Good)
}

// ─── Composite score ─────────────────────────────────────────────

/// Weighted 0–100 blend over whichever vitals are present.
pub fn composite_score(latest: &BTreeMap<Vital, f64>) -> u8 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (vital, value) in latest {
        total += vital.contribution(*value) * vital.weight();
        weight_sum += vital.weight();
    }

    if weight_sum > 0.0 {
        (total / weight_sum).round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Badge shown next to a composite score.
pub fn score_status(score: u8) -> Rating {
    match score {
        90..=u8::MAX => Rating::Good,
        50..=89 => Rating::NeedsImprovement,
        _ => Rating::Poor,
    }
}

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::metrics::{now_ms, rate, MetricSample, Rating, StatsByName, Vital};
use crate::AppState;

use super::AppError;

// ─── Request types ───────────────────────────────────────────────

/// Either a single named sample or a full vitals snapshot.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngestPayload {
    Sample(SubmittedSample),
    Snapshot(VitalsSnapshot),
}

#[derive(Debug, Deserialize)]
struct SubmittedSample {
    name: String,
    value: f64,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    rating: Option<Rating>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VitalsSnapshot {
    cls: f64,
    fid: f64,
    fcp: f64,
    lcp: f64,
    ttfb: f64,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PerformanceQuery {
    limit: Option<String>,
    page: Option<String>,
}

// ─── Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MetricsListing {
    pub metrics: Vec<MetricSample>,
    pub statistics: StatsByName,
    pub count: usize,
}

// ─── POST /api/analytics/performance ─────────────────────────────

pub async fn submit_metric(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Internal(format!("unreadable metric body: {e}")))?;

    let payload: IngestPayload = serde_json::from_value(raw)
        .map_err(|_| AppError::BadRequest("Invalid metric data".into()))?;

    let samples = into_samples(payload, now_ms())?;
    debug!(count = samples.len(), "metric samples accepted");
    state.store.submit_all(samples);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Validates a payload and expands it into rated samples.
fn into_samples(payload: IngestPayload, received_at: i64) -> Result<Vec<MetricSample>, AppError> {
    match payload {
        IngestPayload::Sample(s) => {
            let name = s.name.trim();
            if name.is_empty() {
                return Err(AppError::BadRequest("metric name must not be empty".into()));
            }
            check_value(name, s.value)?;
            Ok(vec![MetricSample {
                rating: s.rating.unwrap_or_else(|| rate(name, s.value)),
                name: name.to_owned(),
                value: s.value,
                timestamp: timestamp_or(s.timestamp, received_at)?,
                url: s.url.unwrap_or_default(),
            }])
        }
        IngestPayload::Snapshot(snap) => {
            let timestamp = timestamp_or(snap.timestamp, received_at)?;
            let url = snap.url.unwrap_or_default();
            let values = [
                (Vital::Cls, snap.cls),
                (Vital::Fid, snap.fid),
                (Vital::Fcp, snap.fcp),
                (Vital::Lcp, snap.lcp),
                (Vital::Ttfb, snap.ttfb),
            ];

            values
                .into_iter()
                .map(|(vital, value)| {
                    check_value(vital.as_str(), value)?;
                    Ok(MetricSample::rated(vital.as_str(), value, timestamp, url.clone()))
                })
                .collect()
        }
    }
}

fn check_value(name: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "value for {name} must be a finite, non-negative number"
        )))
    }
}

fn timestamp_or(timestamp: Option<f64>, fallback: i64) -> Result<i64, AppError> {
    match timestamp {
        None => Ok(fallback),
        Some(ts) if ts.is_finite() && ts >= 0.0 => Ok(ts as i64),
        Some(_) => Err(AppError::BadRequest("timestamp must be a non-negative number".into())),
    }
}

// ─── GET /api/analytics/performance ──────────────────────────────

pub async fn query_metrics(
    State(state): State<Arc<AppState>>,
    query: Option<Query<PerformanceQuery>>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    if query.page.as_deref() == Some("stats") {
        return Json(state.store.statistics()).into_response();
    }

    let limit = query
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(state.config.default_query_limit);

    let view = state.store.view(limit);
    Json(MetricsListing {
        metrics: view.metrics,
        statistics: view.statistics,
        count: view.count,
    })
    .into_response()
}

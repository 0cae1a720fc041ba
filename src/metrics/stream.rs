use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::store::MetricsStore;
use super::StatsByName;
use crate::AppState;

/// Payload of every SSE tick.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSnapshot {
    pub statistics: StatsByName,
    pub count: usize,
    /// Composite over the newest buffered sample of each vital
    pub score: u8,
}

impl PerformanceSnapshot {
    pub fn capture(store: &MetricsStore) -> Self {
        let view = store.view(0);
        Self {
            statistics: view.statistics,
            count: view.count,
            score: view.score,
        }
    }
}

// ─── GET /api/analytics/performance/stream ───────────────────────
/// Server-Sent Events endpoint.
/// Pushes a `PerformanceSnapshot` as JSON every `STREAM_INTERVAL_MS`.

pub async fn performance_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let period = Duration::from_millis(state.config.stream_interval_ms.max(50));
    let interval = tokio::time::interval(period);

    let stream = IntervalStream::new(interval).map(move |_| {
        let snapshot = PerformanceSnapshot::capture(&state.store);
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricSample;

    #[test]
    fn snapshot_reflects_store() {
        let store = MetricsStore::new();
        store.submit(MetricSample::rated("CLS", 0.05, 1, "/"));

        let snap = PerformanceSnapshot::capture(&store);
        assert_eq!(snap.count, 1);
        assert_eq!(snap.statistics["CLS"].count, 1);
        assert_eq!(snap.score, 100);
    }
}

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use vitals_observatory::config::AppConfig;
use vitals_observatory::metrics::{MetricSample, Rating};
use vitals_observatory::observer::{
    replay, Beacon, BeaconError, Collector, EntryType, HttpBeacon, PageTrace, PerformanceEntry,
    ReplayTimeline,
};
use vitals_observatory::{server, AppState};

/// Serves the full router on an ephemeral port.
async fn spawn_server() -> (SocketAddr, Arc<AppState>) {
    let state = Arc::new(AppState::new(AppConfig::default()));
    let app = server::create_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn ingest_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api/analytics/performance")
}

/// An address nothing is listening on.
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn deliver_posts_sample_to_ingest() {
    let (addr, state) = spawn_server().await;
    let beacon = HttpBeacon::new(ingest_url(addr)).unwrap();

    let sample = MetricSample::rated("LCP", 3_100.0, 1_700_000_000_000, "https://me.dev/");
    beacon.deliver(&sample).await.unwrap();

    let stored = state.store.recent(10);
    assert_eq!(stored, vec![sample]);
    assert_eq!(stored[0].rating, Rating::NeedsImprovement);
}

#[tokio::test]
async fn collector_ships_samples_over_http() {
    let (addr, state) = spawn_server().await;
    let beacon = HttpBeacon::new(ingest_url(addr)).unwrap();

    let mut collector = Collector::new(beacon.clone(), "https://me.dev/");
    collector.start_observing(&mut ReplayTimeline::default());
    collector.on_entry(&PerformanceEntry::LayoutShift {
        value: 0.04,
        had_recent_input: false,
    });
    collector.on_entry(&PerformanceEntry::LayoutShift {
        value: 0.08,
        had_recent_input: false,
    });
    beacon.flush().await;

    let stats = state.store.statistics();
    assert_eq!(stats["CLS"].count, 2);
    assert!((stats["CLS"].max - 0.12).abs() < 1e-9);
}

#[tokio::test]
async fn recorded_trace_lands_in_the_store() {
    let (addr, state) = spawn_server().await;
    let beacon = HttpBeacon::new(ingest_url(addr)).unwrap();

    let trace = PageTrace::from_json(
        br#"{
            "url": "https://me.dev/#contact",
            "entries": [
                { "entryType": "navigation", "requestStart": 5, "responseStart": 905 },
                { "entryType": "paint", "name": "first-contentful-paint", "startTime": 1500 },
                { "entryType": "largest-contentful-paint", "startTime": 4600 },
                { "entryType": "first-input", "startTime": 5000, "processingStart": 5050 }
            ]
        }"#,
    )
    .unwrap();
    let report = replay(&trace, beacon.clone(), &mut ReplayTimeline::default());
    beacon.flush().await;

    assert_eq!(report.emitted.len(), 4);
    assert_eq!(state.store.len(), 4);
    // Deliveries race each other, so look samples up by name
    let stored = state.store.recent(4);
    let rating_of = |name: &str| stored.iter().find(|s| s.name == name).map(|s| s.rating);
    assert_eq!(rating_of("TTFB"), Some(Rating::NeedsImprovement));
    assert_eq!(rating_of("FCP"), Some(Rating::Good));
    assert_eq!(rating_of("LCP"), Some(Rating::Poor));
    assert_eq!(rating_of("FID"), Some(Rating::Good));
    assert!(stored.iter().all(|s| s.url == "https://me.dev/#contact"));
}

#[tokio::test]
async fn refused_connection_is_reported_by_deliver() {
    let beacon = HttpBeacon::new(ingest_url(closed_addr().await)).unwrap();
    let sample = MetricSample::rated("FID", 20.0, 1, "/");

    let err = beacon.deliver(&sample).await.unwrap_err();
    assert!(matches!(err, BeaconError::Unreachable(_)));
}

#[tokio::test]
async fn refused_connection_is_swallowed_by_send() {
    let beacon = HttpBeacon::new(ingest_url(closed_addr().await)).unwrap();

    let mut collector = Collector::new(beacon.clone(), "/");
    collector.start_observing(&mut ReplayTimeline::default());
    let sample = collector.on_entry(&PerformanceEntry::LargestContentfulPaint { start_time: 900.0 });
    beacon.flush().await;

    assert!(sample.is_some());
    assert_eq!(collector.metrics().len(), 1);
    assert!(collector.is_observing(EntryType::LargestContentfulPaint));
}

#[tokio::test]
async fn non_success_status_is_a_rejection() {
    let (addr, state) = spawn_server().await;
    let beacon = HttpBeacon::new(format!("http://{addr}/api/not-here")).unwrap();

    let err = beacon
        .deliver(&MetricSample::rated("TTFB", 100.0, 1, "/"))
        .await
        .unwrap_err();
    assert!(matches!(err, BeaconError::Rejected(404)));
    assert!(state.store.is_empty());
}

#[test]
fn send_needs_a_runtime() {
    let beacon = HttpBeacon::new("http://127.0.0.1:9/api/analytics/performance").unwrap();
    let err = beacon
        .send(&MetricSample::rated("CLS", 0.01, 1, "/"))
        .unwrap_err();
    assert!(matches!(err, BeaconError::NoRuntime));
}

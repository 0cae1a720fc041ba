//! Replays a recorded page-load trace through the collector and posts the
//! resulting samples to a running observatory.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_observatory::observer::{replay, EntryType, HttpBeacon, PageTrace, ReplayTimeline};

#[derive(Parser)]
#[command(
    name = "vitals-replay",
    about = "Replay a recorded page-load trace into the analytics endpoint"
)]
struct Cli {
    /// Trace file: `{ "url": .., "entries": [..] }` or a bare entry array
    trace: PathBuf,

    /// Ingest endpoint the samples are posted to
    #[arg(
        long,
        env = "ANALYTICS_ENDPOINT",
        default_value = "http://localhost:3000/api/analytics/performance"
    )]
    endpoint: String,

    /// Page URL reported with every sample, overriding the trace's own
    #[arg(long)]
    url: Option<String>,

    /// Entry types the timeline should refuse, e.g. `layout-shift,first-input`
    #[arg(long, value_delimiter = ',', value_parser = parse_entry_type)]
    unsupported: Vec<EntryType>,
}

fn parse_entry_type(raw: &str) -> Result<EntryType, String> {
    EntryType::parse(raw).ok_or_else(|| format!("unknown entry type '{raw}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "vitals_observatory=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let raw = tokio::fs::read(&cli.trace)
        .await
        .with_context(|| format!("reading {}", cli.trace.display()))?;
    let mut trace = PageTrace::from_json(&raw).context("parsing trace")?;
    if let Some(url) = cli.url {
        trace.url = url;
    }
    info!(
        entries = trace.entries.len(),
        skipped = trace.skipped,
        url = %trace.url,
        "trace loaded"
    );

    let beacon = HttpBeacon::new(&cli.endpoint).context("building HTTP client")?;
    let mut timeline = ReplayTimeline::without(cli.unsupported);
    let report = replay(&trace, beacon.clone(), &mut timeline);
    beacon.flush().await;

    for sample in &report.emitted {
        println!(
            "{:<5} {:>10.3}  {:?}",
            sample.name, sample.value, sample.rating
        );
    }
    println!(
        "score {} ({:?}), {} samples sent to {}",
        report.score,
        report.status,
        report.emitted.len(),
        beacon.endpoint()
    );

    Ok(())
}

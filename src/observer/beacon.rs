use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::metrics::MetricSample;

/// Give up on a single delivery after this long.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("analytics endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("analytics endpoint rejected sample with status {0}")]
    Rejected(u16),
    #[error("no async runtime to deliver on")]
    NoRuntime,
}

impl From<reqwest::Error> for BeaconError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Rejected(status.as_u16()),
            None => Self::Unreachable(e.to_string()),
        }
    }
}

/// One-way delivery of samples to the aggregator.
pub trait Beacon {
    fn send(&self, sample: &MetricSample) -> Result<(), BeaconError>;
}

/// POSTs each sample as a single-metric JSON body to the ingest endpoint.
///
/// `send` only schedules the request; the outcome is logged from the
/// spawned task and never reaches the caller. Clones share one client and
/// one set of in-flight deliveries; dropping the last clone aborts any that
/// have not finished, so call [`flush`](Self::flush) before exiting.
#[derive(Clone)]
pub struct HttpBeacon {
    client: reqwest::Client,
    endpoint: String,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl HttpBeacon {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, BeaconError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Delivers one sample and reports the outcome.
    pub async fn deliver(&self, sample: &MetricSample) -> Result<(), BeaconError> {
        deliver(&self.client, &self.endpoint, sample).await
    }

    /// Waits for every scheduled delivery to finish.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.in_flight.lock());
        while pending.join_next().await.is_some() {}
    }
}

impl Beacon for HttpBeacon {
    fn send(&self, sample: &MetricSample) -> Result<(), BeaconError> {
        let handle = Handle::try_current().map_err(|_| BeaconError::NoRuntime)?;

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let sample = sample.clone();

        self.in_flight.lock().spawn_on(
            async move {
                match deliver(&client, &endpoint, &sample).await {
                    Ok(()) => debug!(metric = %sample.name, "performance metric delivered"),
                    Err(e) => {
                        warn!(metric = %sample.name, error = %e, "failed to send performance metric")
                    }
                }
            },
            &handle,
        );
        Ok(())
    }
}

async fn deliver(
    client: &reqwest::Client,
    endpoint: &str,
    sample: &MetricSample,
) -> Result<(), BeaconError> {
    client
        .post(endpoint)
        .json(sample)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

//! Sends bursts and tallies what came back

use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::plan::Target;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestOutcome {
    Success(u16),
    ClientError(u16),
    ServerError(u16),
    /// No HTTP answer at all
    Failed,
}

impl RequestOutcome {
    fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::ClientError(status),
            500..=599 => Self::ServerError(status),
            _ => Self::Success(status),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BurstSummary {
    pub sent: u64,
    pub succeeded: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub failed: u64,
}

impl BurstSummary {
    pub fn record(&mut self, outcome: RequestOutcome) {
        self.sent += 1;
        match outcome {
            RequestOutcome::Success(_) => self.succeeded += 1,
            RequestOutcome::ClientError(_) => self.client_errors += 1,
            RequestOutcome::ServerError(_) => self.server_errors += 1,
            RequestOutcome::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &BurstSummary) {
        self.sent += other.sent;
        self.succeeded += other.succeeded;
        self.client_errors += other.client_errors;
        self.server_errors += other.server_errors;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct Runner {
    client: Client,
    base_url: String,
}

impl Runner {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn send(&self, target: &Target) -> RequestOutcome {
        let url = format!("{}{}", self.base_url, target.path());
        let request = match target {
            Target::Get(_) => self.client.get(&url),
            Target::CreateOrder(body) => self.client.post(&url).json(body),
        };

        let started = Instant::now();
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(
                    method = target.method(),
                    path = target.path(),
                    status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request completed"
                );
                RequestOutcome::from_status(status)
            }
            Err(e) => {
                debug!(method = target.method(), path = target.path(), error = %e, "Request failed");
                RequestOutcome::Failed
            }
        }
    }

    /// Send every target concurrently and wait for all of them
    pub async fn fire_burst(&self, targets: Vec<Target>) -> BurstSummary {
        let mut in_flight = JoinSet::new();
        for target in targets {
            let runner = self.clone();
            in_flight.spawn(async move { runner.send(&target).await });
        }

        let mut summary = BurstSummary::default();
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    warn!(error = %e, "Request task failed");
                    summary.record(RequestOutcome::Failed);
                }
            }
        }
        summary
    }
}

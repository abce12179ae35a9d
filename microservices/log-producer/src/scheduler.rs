//! Fixed-rate tick loops
//!
//! Every tick runs as its own task: when a run outlasts the period the next
//! tick starts anyway, so runs may overlap.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

pub fn spawn_every<F, Fut>(name: &'static str, period: Duration, task: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(name, period_ms = period.as_millis() as u64, "Scheduler started");

        loop {
            ticker.tick().await;
            tokio::spawn(task());
        }
    })
}

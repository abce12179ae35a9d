//! The consume loop

use logpipe_bus::MessageSource;
use std::time::Duration;
use tracing::{info, warn};

use crate::handler::MessageHandler;

/// Pause after a receive error so a broken connection does not spin
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Drain `source` through `handler` until the source closes.
///
/// Returns the number of messages handled.
pub async fn run_ingest<S>(source: &S, handler: &MessageHandler) -> u64
where
    S: MessageSource + ?Sized,
{
    let mut handled = 0u64;

    while let Some(next) = source.next_message().await {
        match next {
            Ok(message) => {
                handler.handle(&message).await;
                handled += 1;
            }
            Err(e) => {
                handler.stats().receive_errors.inc();
                warn!(error = %e, "Receive failed");
                tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
            }
        }
    }

    info!(handled, "Message source closed");
    handled
}

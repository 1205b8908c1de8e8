//! Trigger subscription helper shared by both runtimes.

use heatsync_core::TriggerEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Next trigger event, or never when there is no subscription.
///
/// Lagging skips the missed events. A closed link drops the subscription,
/// after which this waits forever. Cancel safe.
pub(crate) async fn next_trigger(
    triggers: &mut Option<broadcast::Receiver<TriggerEvent>>,
) -> TriggerEvent {
    loop {
        let Some(rx) = triggers.as_mut() else {
            return std::future::pending().await;
        };
        match rx.recv().await {
            Ok(event) => return event,
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "trigger events skipped"),
            Err(RecvError::Closed) => {
                warn!("trigger link closed");
                *triggers = None;
            },
        }
    }
}

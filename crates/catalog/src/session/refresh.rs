//! Background token refresh.

use std::time::Duration;

use holocron_core::Session;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::SessionStore;

/// Periodically refreshes the current session until cancelled.
///
/// Every refreshed session is published on the watch channel returned by
/// [`RefreshTask::spawn`]. A failed refresh is treated as a logout: the
/// stored session is cleared, `None` is published and the task stops.
///
/// The task is aborted when this handle is dropped.
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Spawn the refresh loop on the current Tokio runtime.
    ///
    /// The first refresh happens one full `period` after spawning.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(store: SessionStore, period: Duration) -> (Self, watch::Receiver<Option<Session>>) {
        let (tx, rx) = watch::channel(store.current_session());

        info!(period_secs = period.as_secs(), "Spawning session refresh task");
        let handle = tokio::spawn(run(store, period, tx));

        (Self { handle }, rx)
    }

    /// Whether the loop has stopped (after a failed refresh or cancellation).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop refreshing.
    pub fn cancel(self) {
        debug!("Cancelling session refresh task");
        self.handle.abort();
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(store: SessionStore, period: Duration, tx: watch::Sender<Option<Session>>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match store.refresh_session().await {
            Ok(session) => {
                debug!("Session tokens rotated");
                tx.send_replace(Some(session));
            }
            Err(e) => {
                error!(error = %e, "Token refresh failed, logging out");
                if let Err(e) = store.logout() {
                    warn!(error = %e, "Failed to clear session after refresh failure");
                }
                tx.send_replace(None);
                return;
            }
        }
    }
}

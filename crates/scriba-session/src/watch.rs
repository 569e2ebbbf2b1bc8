//! Periodic token-expiry check.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::{AuthGateway, SessionManager, SessionState};

/// Guard for the background task started by
/// [`SessionManager::spawn_expiry_watch`].
///
/// The task stops when this guard is dropped or when the manager itself
/// goes away, whichever happens first.
#[derive(Debug)]
pub struct ExpiryWatch {
    handle: JoinHandle<()>,
}

impl ExpiryWatch {
    pub(crate) fn spawn<A: AuthGateway>(
        manager: Weak<SessionManager<A>>,
        every: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(every);
            // A late wake-up checks once, it does not replay missed checks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let Some(manager) = manager.upgrade() else {
                    tracing::debug!("session manager dropped, expiry watch exiting");
                    break;
                };

                if manager.check_expiry() == SessionState::Expired {
                    tracing::info!("expiry watch ended the session");
                }
            }
        });

        tracing::debug!(every_secs = every.as_secs(), "expiry watch started");
        Self { handle }
    }

    /// Stops the watch now instead of on drop.
    pub fn stop(self) {}

    /// Returns `true` once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

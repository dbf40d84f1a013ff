//! Periodic background expiry sweep.
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::SessionRepository;
use crate::error::{Result, SecurityError};

/// Handle to a running sweeper task
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to finish its current pass
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.task.await {
            warn!(error = %err, "session sweeper ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that runs `clean_expired_sessions` every `period`.
///
/// The task holds only a weak reference and exits on its own once the
/// repository is dropped. Must be called from within a Tokio runtime.
pub fn spawn_sweeper(repository: &Arc<SessionRepository>, period: Duration) -> Result<SweeperHandle> {
    if period.is_zero() {
        return Err(SecurityError::InvalidArgument(
            "sweep interval must be positive".into(),
        ));
    }

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    let repository: Weak<SessionRepository> = Arc::downgrade(repository);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(repository) = repository.upgrade() else {
                        debug!("session repository dropped, sweeper exiting");
                        break;
                    };
                    repository.clean_expired_sessions();
                }
                _ = signal.notified() => {
                    debug!("session sweeper stopping");
                    break;
                }
            }
        }
    });

    Ok(SweeperHandle { shutdown, task })
}

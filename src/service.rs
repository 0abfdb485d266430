//! Periodic background work
//!
//! Runs the retention sweep and the trigger check as independent tokio
//! tasks. Each task runs one round on the blocking pool as soon as it is
//! spawned, then sleeps for its interval, read fresh from the shared
//! configuration, before the next round.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{FlightRecorderConfig, SharedConfig};
use crate::recorder::FlightRecorder;
use crate::trigger::TriggerChecker;

/// Owner of the retention and trigger tasks
///
/// Dropping the service aborts both tasks.
pub struct FlightRecorderService {
    cleanup_handle: Option<JoinHandle<()>>,
    trigger_handle: Option<JoinHandle<()>>,
}

impl FlightRecorderService {
    /// Spawn the cleanup sweep and, when `trigger-enabled` is set, the
    /// trigger check
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        recorder: Arc<FlightRecorder>,
        checker: Arc<TriggerChecker>,
        config: SharedConfig,
    ) -> Self {
        let cleanup_handle = spawn_fixed_delay(
            "recording cleanup",
            Arc::clone(&config),
            FlightRecorderConfig::recording_cleanup_interval,
            move || match recorder.cleanup_old_recordings() {
                Ok(deleted) => log::debug!("Cleanup deleted {deleted} recording(s)"),
                Err(e) => log::error!("Recording cleanup failed: {e}"),
            },
        );

        let trigger_handle = if config.read().trigger_enabled {
            Some(spawn_fixed_delay(
                "trigger check",
                Arc::clone(&config),
                FlightRecorderConfig::trigger_check_interval,
                move || checker.check(),
            ))
        } else {
            log::info!("Triggers disabled; trigger check not scheduled");
            None
        };

        Self {
            cleanup_handle: Some(cleanup_handle),
            trigger_handle,
        }
    }

    /// Whether the trigger check task was scheduled
    #[must_use]
    pub fn triggers_scheduled(&self) -> bool {
        self.trigger_handle.is_some()
    }

    /// Stop both tasks
    pub fn shutdown(&mut self) {
        log::info!("Shutting down flight recorder service");
        self.abort_tasks();
    }

    fn abort_tasks(&mut self) {
        for handle in [self.cleanup_handle.take(), self.trigger_handle.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

impl Drop for FlightRecorderService {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

fn spawn_fixed_delay<F>(
    name: &'static str,
    config: SharedConfig,
    interval: fn(&FlightRecorderConfig) -> Duration,
    work: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let work = Arc::new(work);
    tokio::spawn(async move {
        loop {
            let round = Arc::clone(&work);
            if let Err(e) = tokio::task::spawn_blocking(move || round()).await {
                log::error!("The {name} task panicked: {e}");
            }

            let delay = interval(&config.read());
            tokio::time::sleep(delay).await;
        }
    })
}

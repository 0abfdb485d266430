//! Periodic cleanup of finished recordings
//!
//! One sweep reads the policy from the shared configuration, takes the
//! store lock, computes the eligible ids against that single snapshot and
//! deletes them before releasing the lock.

use chrono::{DateTime, Utc};

use super::core::FlightRecorder;
use super::session::RecordingSession;
use super::store::StoreGuard;
use crate::config::CleanupType;
use crate::error::{FlightRecorderError, Result};
use crate::types::{RecordingId, RecordingState};

impl FlightRecorder {
    /// Delete finished recordings according to the configured cleanup type
    ///
    /// Returns the number of recordings deleted. Fails when no cleanup type
    /// is configured. A failure to delete one recording is logged and does
    /// not stop the others. That recording stays listed, closed, and is
    /// picked up again by the next sweep.
    pub fn cleanup_old_recordings(&self) -> Result<usize> {
        let (cleanup_type, ttl, ttl_unit, max) = {
            let config = self.config.read();
            (
                config.recording_cleanup_type,
                config.old_recordings_ttl,
                config.old_recordings_ttl_time_unit,
                config.old_recordings_max,
            )
        };

        let mut sessions = self.store.lock();
        let deletable = match cleanup_type {
            Some(CleanupType::Ttl) => {
                let deadline = Utc::now().checked_sub_signed(ttl_unit.chrono_duration(ttl));
                let deletable = deletable_by_ttl(&mut sessions, deadline);
                log::debug!(
                    "Found {} finished recording(s) to be deleted based on TTL ({} {:?})",
                    deletable.len(),
                    ttl,
                    ttl_unit
                );
                deletable
            }
            Some(CleanupType::Count) => {
                let deletable = deletable_by_count(&mut sessions, max);
                log::debug!(
                    "Found {} finished recording(s) to be deleted based on COUNT threshold ({} recordings)",
                    deletable.len(),
                    max
                );
                deletable
            }
            None => {
                return Err(FlightRecorderError::invalid_config(
                    "No CleanupType configured. Deletion failed.",
                ));
            }
        };

        let mut deleted = 0;
        for id in deletable {
            match Self::delete_locked(&mut sessions, id) {
                Ok(()) => deleted += 1,
                Err(e) => log::warn!("Failed to delete recording {id}: {e}"),
            }
        }
        Ok(deleted)
    }
}

/// Finished recordings started before `deadline`
///
/// A recording that never started is aged by its stop time, and one with
/// neither timestamp is always eligible. A `None` deadline (TTL reaching
/// past the representable range) selects nothing.
fn deletable_by_ttl(
    sessions: &mut StoreGuard<'_>,
    deadline: Option<DateTime<Utc>>,
) -> Vec<RecordingId> {
    let Some(deadline) = deadline else {
        return Vec::new();
    };

    let mut deletable: Vec<RecordingId> = sessions
        .values_mut()
        .filter(|session| {
            session.state().is_finished()
                && recording_age_mark(session).is_none_or(|mark| mark < deadline)
        })
        .map(close_if_stopped)
        .collect();
    deletable.sort_unstable();
    deletable
}

/// The oldest finished recordings above `max`
///
/// Running recordings among the oldest are skipped, so a sweep may leave
/// more than `max` recordings behind.
fn deletable_by_count(sessions: &mut StoreGuard<'_>, max: usize) -> Vec<RecordingId> {
    let total = sessions.len();
    if total <= max {
        return Vec::new();
    }

    let mut by_age: Vec<&mut RecordingSession> = sessions.values_mut().collect();
    by_age.sort_by_key(|session| (session.recording().start_time(), session.id()));

    by_age
        .into_iter()
        .take(total - max)
        .filter(|session| session.state().is_finished())
        .map(close_if_stopped)
        .collect()
}

fn recording_age_mark(session: &RecordingSession) -> Option<DateTime<Utc>> {
    let recording = session.recording();
    recording.start_time().or_else(|| recording.stop_time())
}

fn close_if_stopped(session: &mut RecordingSession) -> RecordingId {
    let id = session.id();
    if session.state() == RecordingState::Stopped
        && let Err(e) = session.recording_mut().close()
    {
        log::info!("Cannot close recording {id}: {e}");
    }
    id
}

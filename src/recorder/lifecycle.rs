//! Recording lifecycle: create, start, stop, delete
//!
//! Each public method takes the store lock once and delegates to a
//! `*_locked` variant, so composite operations such as
//! [`FlightRecorder::start_recording_for`] run under a single lock scope.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::core::{FlightRecorder, RECORDING_NAME};
use super::helpers::{create_destination_file, merge_settings, remove_destination_file};
use super::session::RecordingSession;
use super::store::StoreGuard;
use crate::engine::{EngineConfiguration, RecordingOptions, Settings};
use crate::error::Result;
use crate::types::{RecordingId, RecordingState, StartRecordingCommand};

impl FlightRecorder {
    /// Allocate a new recording with the effective settings and register it
    ///
    /// The recording stays in the `NEW` state until started.
    pub fn new_recording(&self, command: &StartRecordingCommand) -> Result<RecordingId> {
        let mut sessions = self.store.lock();
        self.new_recording_locked(&mut sessions, command)
    }

    /// Settings for a new recording: the selected base configuration merged
    /// with, and overridden by, `custom_settings`
    pub fn configuration_settings(
        &self,
        configurations: &[EngineConfiguration],
        custom_settings: Option<&Settings>,
    ) -> Settings {
        let chosen = self.config.read().base_configuration().to_string();
        merge_settings(&chosen, configurations, custom_settings)
    }

    /// Start a recording now, or after `delay`
    ///
    /// Unknown ids are logged and ignored.
    pub fn start_recording(&self, id: RecordingId, delay: Option<Duration>) -> Result<()> {
        let mut sessions = self.store.lock();
        Self::start_locked(&mut sessions, id, delay)
    }

    /// Stop a recording if it is running and return its destination file
    ///
    /// Stopping is idempotent, so this doubles as "fetch the file of a
    /// finished recording". Returns `None` for unknown ids.
    pub fn stop_recording(&self, id: RecordingId) -> Result<Option<PathBuf>> {
        let mut sessions = self.store.lock();
        Self::stop_locked(&mut sessions, id)
    }

    /// Apply duration, destination and size/age caps from `command`
    pub fn set_recording_options(
        &self,
        id: RecordingId,
        command: &StartRecordingCommand,
        destination: &Path,
    ) -> Result<()> {
        let mut sessions = self.store.lock();
        Self::set_options_locked(&mut sessions, id, command, destination)
    }

    /// Create, configure and start a recording in one step
    ///
    /// The destination file is created under the configured base path (the
    /// platform temp dir when unset). A failure to create it fails the call
    /// and leaves no session behind.
    pub fn start_recording_for(&self, command: &StartRecordingCommand) -> Result<RecordingId> {
        command.validate()?;
        let base_path = self.config.read().base_path.clone();

        let mut sessions = self.store.lock();
        self.start_for_locked(&mut sessions, command, base_path.as_deref())
    }

    /// Stop `previous` if it is still running, then start a new recording
    /// for `command`, all under one store lock
    ///
    /// A failure to stop `previous` is logged and does not prevent the start.
    pub fn replace_recording(
        &self,
        previous: Option<RecordingId>,
        command: &StartRecordingCommand,
    ) -> Result<RecordingId> {
        command.validate()?;
        let base_path = self.config.read().base_path.clone();

        let mut sessions = self.store.lock();
        if let Some(previous) = previous
            && let Err(e) = Self::stop_locked(&mut sessions, previous)
        {
            log::warn!("Failed to stop recording {previous}: {e}");
        }
        self.start_for_locked(&mut sessions, command, base_path.as_deref())
    }

    /// Stop and close a recording as needed, unlink its file and forget it
    ///
    /// Unknown ids are logged and ignored. When the file cannot be removed
    /// the error is returned and the recording, now closed, stays listed so
    /// the delete can be retried.
    pub fn delete_recording(&self, id: RecordingId) -> Result<()> {
        let mut sessions = self.store.lock();
        Self::delete_locked(&mut sessions, id)
    }

    /// True for unknown ids and for `STOPPED`/`CLOSED` recordings
    #[must_use]
    pub fn is_recording_stopped(&self, id: RecordingId) -> bool {
        self.store
            .lock()
            .get(id)
            .is_none_or(|session| session.state().is_finished())
    }

    fn start_for_locked(
        &self,
        sessions: &mut StoreGuard<'_>,
        command: &StartRecordingCommand,
        base_path: Option<&Path>,
    ) -> Result<RecordingId> {
        let id = self.new_recording_locked(sessions, command)?;

        let destination = match create_destination_file(base_path) {
            Ok(path) => path,
            Err(e) => {
                Self::discard_locked(sessions, id);
                return Err(e);
            }
        };
        log::info!("Recording {} to file {}", id, destination.display());

        let started = Self::set_options_locked(sessions, id, command, &destination)
            .and_then(|()| Self::start_locked(sessions, id, command.delay()));
        if let Err(e) = started {
            Self::discard_locked(sessions, id);
            if let Err(remove_err) = remove_destination_file(&destination) {
                log::warn!("Failed to remove {}: {}", destination.display(), remove_err);
            }
            return Err(e);
        }

        Ok(id)
    }

    pub(super) fn new_recording_locked(
        &self,
        sessions: &mut StoreGuard<'_>,
        command: &StartRecordingCommand,
    ) -> Result<RecordingId> {
        let settings =
            self.configuration_settings(&self.engine.configurations(), command.custom_settings.as_ref());
        let recording = self.engine.allocate(RECORDING_NAME, settings)?;
        let id = recording.id();

        let session = RecordingSession::new(recording, command.description_or_empty());
        if sessions.put(session).is_some() {
            log::warn!("Engine reused recording id {id}; previous session replaced");
        }
        log::info!("Created recording {id}");
        Ok(id)
    }

    pub(super) fn start_locked(
        sessions: &mut StoreGuard<'_>,
        id: RecordingId,
        delay: Option<Duration>,
    ) -> Result<()> {
        let Some(session) = sessions.get_mut(id) else {
            log::warn!("No recording with id {id} found");
            return Ok(());
        };

        match delay {
            None => session.recording_mut().start(),
            Some(delay) => {
                log::info!("Recording {id} scheduled to start in {delay:?}");
                session.recording_mut().schedule_start(delay)
            }
        }
    }

    pub(super) fn stop_locked(
        sessions: &mut StoreGuard<'_>,
        id: RecordingId,
    ) -> Result<Option<PathBuf>> {
        let Some(session) = sessions.get_mut(id) else {
            log::warn!("No recording with id {id} found");
            return Ok(None);
        };

        let recording = session.recording_mut();
        if recording.state() == RecordingState::Running {
            log::info!("Stopping recording {id}");
            recording.stop()?;
        }
        Ok(recording.destination().map(Path::to_path_buf))
    }

    fn set_options_locked(
        sessions: &mut StoreGuard<'_>,
        id: RecordingId,
        command: &StartRecordingCommand,
        destination: &Path,
    ) -> Result<()> {
        let Some(session) = sessions.get_mut(id) else {
            log::warn!("No recording with id {id} found");
            return Ok(());
        };

        let options = RecordingOptions {
            duration: command.recording_duration()?,
            destination: destination.to_path_buf(),
            to_disk: true,
            max_age: command.max_age(),
            max_size: command.max_size,
        };
        session.recording_mut().apply_options(options)
    }

    pub(super) fn delete_locked(sessions: &mut StoreGuard<'_>, id: RecordingId) -> Result<()> {
        let Some(session) = sessions.get_mut(id) else {
            log::warn!("No recording with id {id} found");
            return Ok(());
        };

        let recording = session.recording_mut();
        match recording.state() {
            RecordingState::Running => {
                if let Err(e) = recording.stop() {
                    log::warn!("Failed to stop recording {id}: {e}");
                }
                if let Err(e) = recording.close() {
                    log::warn!("Failed to close recording {id}: {e}");
                }
            }
            RecordingState::Stopped | RecordingState::New | RecordingState::Delayed => {
                if let Err(e) = recording.close() {
                    log::warn!("Failed to close recording {id}: {e}");
                }
            }
            RecordingState::Closed => {}
        }

        if let Some(path) = recording.destination()
            && let Err(e) = remove_destination_file(path)
        {
            log::warn!(
                "Failed to remove {} of recording {id}; keeping the recording: {e}",
                path.display()
            );
            return Err(e);
        }

        sessions.remove(id);
        log::info!("Deleted recording {id}");
        Ok(())
    }

    /// Drop a half-created session without touching any file
    fn discard_locked(sessions: &mut StoreGuard<'_>, id: RecordingId) {
        if let Some(mut session) = sessions.remove(id)
            && let Err(e) = session.recording_mut().close()
        {
            log::warn!("Failed to close discarded recording {id}: {e}");
        }
    }
}

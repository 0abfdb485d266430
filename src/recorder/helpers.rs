//! Helper functions for settings, destination files and session views
//!
//! Pure functions, or thin wrappers over the filesystem, kept apart from
//! the locking logic in the lifecycle and retention modules.

use std::io;
use std::path::{Path, PathBuf};

use super::session::RecordingSession;
use crate::engine::{EngineConfiguration, Settings};
use crate::error::Result;
use crate::types::PublicSession;

/// Resolve the settings for a new recording
///
/// Every engine configuration whose name contains `chosen` contributes its
/// settings; caller overrides are applied last and always win.
pub(super) fn merge_settings(
    chosen: &str,
    configurations: &[EngineConfiguration],
    custom_settings: Option<&Settings>,
) -> Settings {
    let mut settings = Settings::new();

    for configuration in configurations {
        log::debug!("Found configuration {}", configuration.name);
        if configuration.name.contains(chosen) {
            log::info!("Using configuration {}", configuration.name);
            settings.extend(
                configuration
                    .settings
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
    }

    if let Some(overrides) = custom_settings {
        settings.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    settings
}

/// Create a uniquely named `recording*.jfr` file under `base_path`, or the
/// platform temp dir when unset, and keep it on disk
pub(super) fn create_destination_file(base_path: Option<&Path>) -> Result<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("recording").suffix(".jfr");

    let file = match base_path {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Unlink a destination file; an already missing file is not an error
pub(super) fn remove_destination_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Recording file {} was already gone", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Project a stored session into its public view
pub(super) fn public_session(session: &RecordingSession) -> PublicSession {
    let recording = session.recording();
    let status = recording.state();

    PublicSession {
        id: recording.id(),
        started_at: recording.start_time(),
        status,
        finished_at: if status.is_finished() {
            recording.stop_time()
        } else {
            None
        },
        description: session.description().to_string(),
    }
}

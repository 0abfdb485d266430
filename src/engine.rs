//! Profiling engine seam
//!
//! The engine captures stack samples and writes the recording file; this
//! crate only tracks, retires and triggers its recordings. Implementations
//! wrap whatever sampler the host process uses.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::types::{RecordingId, RecordingState};

/// Key/value settings passed to the engine when allocating a recording
pub type Settings = HashMap<String, String>;

/// A named base settings set offered by the engine (e.g. "default", "profile")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfiguration {
    pub name: String,
    pub settings: Settings,
}

impl EngineConfiguration {
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }
}

/// Options applied to a recording before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingOptions {
    /// How long the engine records before stopping on its own
    pub duration: Duration,
    /// File the engine writes the recording to
    pub destination: PathBuf,
    /// Persist samples to disk instead of keeping them in memory
    pub to_disk: bool,
    /// Oldest data the engine keeps
    pub max_age: Option<Duration>,
    /// Largest amount of data in bytes the engine keeps
    pub max_size: Option<u64>,
}

/// One recording owned by the engine
///
/// State transitions are driven by the engine; callers only request them.
pub trait Recording: Send {
    fn id(&self) -> RecordingId;

    fn state(&self) -> RecordingState;

    /// Set once the recording has actually started
    fn start_time(&self) -> Option<DateTime<Utc>>;

    /// Set once the recording has stopped
    fn stop_time(&self) -> Option<DateTime<Utc>>;

    fn destination(&self) -> Option<&Path>;

    fn apply_options(&mut self, options: RecordingOptions) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn schedule_start(&mut self, delay: Duration) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Allocates recordings
pub trait ProfilingEngine: Send + Sync {
    /// Base configurations known to the engine
    fn configurations(&self) -> Vec<EngineConfiguration>;

    /// Allocate a new recording in the `NEW` state with the given settings
    fn allocate(&self, name: &str, settings: Settings) -> Result<Box<dyn Recording>>;
}

//! Flight recorder configuration
//!
//! Loaded once from TOML at startup and then shared behind a lock so the
//! retention sweep can re-read the cleanup policy on every run.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{FlightRecorderError, Result};
use crate::types::{StartRecordingCommand, TimeUnit};

/// Configuration shared between the recorder, the trigger checker and the service
pub type SharedConfig = Arc<RwLock<FlightRecorderConfig>>;

/// Base configuration selected when `custom-config` is unset
pub const DEFAULT_BASE_CONFIGURATION: &str = "profile";

/// Retention policy for finished recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleanupType {
    /// Delete finished recordings started longer ago than the TTL
    #[serde(rename = "TTL")]
    Ttl,
    /// Keep at most `old-recordings-max` recordings
    #[serde(rename = "COUNT")]
    Count,
}

impl FromStr for CleanupType {
    type Err = FlightRecorderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TTL" => Ok(Self::Ttl),
            "COUNT" => Ok(Self::Count),
            other => Err(FlightRecorderError::invalid_config(format!(
                "Unknown CleanupType '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CleanupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ttl => "TTL",
            Self::Count => "COUNT",
        })
    }
}

/// A boolean metric expression bound to the recording it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Trigger {
    pub expression: String,
    pub start_recording_command: StartRecordingCommand,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FlightRecorderConfig {
    /// Global switch; the trigger checker does nothing while false
    pub enabled: bool,
    pub recording_cleanup_type: Option<CleanupType>,
    pub old_recordings_ttl: u64,
    pub old_recordings_ttl_time_unit: TimeUnit,
    pub old_recordings_max: usize,
    pub recording_cleanup_interval_ms: u64,
    /// Whether the trigger task is spawned at all
    pub trigger_enabled: bool,
    pub trigger_check_interval_ms: u64,
    /// Directory for recording files; the platform temp dir when unset
    pub base_path: Option<PathBuf>,
    /// Base engine configuration name; `profile` when unset
    pub custom_config: Option<String>,
    /// Type-name prefix for the filtered flame graph
    pub flame_graph_base_package: Option<String>,
    #[serde(rename = "trigger")]
    pub triggers: Vec<Trigger>,
}

impl Default for FlightRecorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recording_cleanup_type: None,
            old_recordings_ttl: 1,
            old_recordings_ttl_time_unit: TimeUnit::Hours,
            old_recordings_max: 10,
            recording_cleanup_interval_ms: 60_000,
            trigger_enabled: true,
            trigger_check_interval_ms: 10_000,
            base_path: None,
            custom_config: None,
            flame_graph_base_package: None,
            triggers: Vec::new(),
        }
    }
}

impl FlightRecorderConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading flight recorder configuration from {}", path.as_ref().display());
        Self::from_toml_str(&source)
    }

    /// Reject values that would make the periodic tasks spin or every trigger fail
    pub fn validate(&self) -> Result<()> {
        if self.recording_cleanup_interval_ms == 0 {
            return Err(FlightRecorderError::invalid_config(
                "recording-cleanup-interval-ms must be greater than zero",
            ));
        }
        if self.trigger_check_interval_ms == 0 {
            return Err(FlightRecorderError::invalid_config(
                "trigger-check-interval-ms must be greater than zero",
            ));
        }
        for trigger in &self.triggers {
            trigger.start_recording_command.validate().map_err(|e| {
                FlightRecorderError::invalid_config(format!(
                    "trigger '{}': {e}",
                    trigger.expression
                ))
            })?;
        }
        Ok(())
    }

    /// Wrap in a [`SharedConfig`]
    #[must_use]
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Change the cleanup policy by name, e.g. from an admin surface
    pub fn set_cleanup_type(&mut self, name: &str) -> Result<()> {
        self.recording_cleanup_type = Some(name.parse()?);
        Ok(())
    }

    /// Base engine configuration name to select
    #[must_use]
    pub fn base_configuration(&self) -> &str {
        self.custom_config
            .as_deref()
            .unwrap_or(DEFAULT_BASE_CONFIGURATION)
    }

    #[must_use]
    pub fn recording_cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.recording_cleanup_interval_ms)
    }

    #[must_use]
    pub fn trigger_check_interval(&self) -> Duration {
        Duration::from_millis(self.trigger_check_interval_ms)
    }
}

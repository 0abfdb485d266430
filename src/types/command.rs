//! Parameters for starting one recording session

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::time_unit::TimeUnit;
use crate::error::{FlightRecorderError, Result};

/// Request parameters for starting a recording
///
/// `duration` and `time_unit` are required; every other field is optional.
/// Optional `(amount, unit)` pairs only take effect when both halves are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRecordingCommand {
    /// How long the recording runs
    pub duration: Option<u64>,
    /// Unit for `duration`
    pub time_unit: Option<TimeUnit>,
    /// Free-form description shown in session listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Delay before the recording starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_duration: Option<u64>,
    /// Unit for `delay_duration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_unit: Option<TimeUnit>,
    /// Maximum age of data kept by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_duration: Option<u64>,
    /// Unit for `max_age_duration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_unit: Option<TimeUnit>,
    /// Maximum size in bytes of data kept by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Settings that override the selected base configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_settings: Option<HashMap<String, String>>,
}

impl StartRecordingCommand {
    /// Command for a recording of `amount` `unit`s with no other options
    #[must_use]
    pub fn new(amount: u64, unit: TimeUnit) -> Self {
        Self {
            duration: Some(amount),
            time_unit: Some(unit),
            ..Default::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the start delay
    #[must_use]
    pub fn with_delay(mut self, amount: u64, unit: TimeUnit) -> Self {
        self.delay_duration = Some(amount);
        self.delay_unit = Some(unit);
        self
    }

    /// Set the maximum age
    #[must_use]
    pub fn with_max_age(mut self, amount: u64, unit: TimeUnit) -> Self {
        self.max_age_duration = Some(amount);
        self.max_age_unit = Some(unit);
        self
    }

    /// Set the maximum size in bytes
    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Add one custom setting override
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_settings
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Reject commands without a duration
    pub fn validate(&self) -> Result<()> {
        if self.duration.is_none() || self.time_unit.is_none() {
            return Err(FlightRecorderError::invalid_command(
                "Duration and TimeUnit cannot be null",
            ));
        }
        Ok(())
    }

    /// Recording duration, validated
    pub fn recording_duration(&self) -> Result<Duration> {
        self.validate()?;
        match (self.duration, self.time_unit) {
            (Some(amount), Some(unit)) => Ok(unit.duration(amount)),
            _ => Err(FlightRecorderError::invalid_command(
                "Duration and TimeUnit cannot be null",
            )),
        }
    }

    /// Start delay, if both halves are set
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        pair(self.delay_duration, self.delay_unit)
    }

    /// Maximum age, if both halves are set
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        pair(self.max_age_duration, self.max_age_unit)
    }

    /// Description, empty when unset
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

fn pair(amount: Option<u64>, unit: Option<TimeUnit>) -> Option<Duration> {
    Some(unit?.duration(amount?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_duration_is_rejected() {
        let command = StartRecordingCommand {
            time_unit: Some(TimeUnit::Seconds),
            ..Default::default()
        };
        assert!(matches!(
            command.validate(),
            Err(FlightRecorderError::InvalidCommand(_))
        ));
        assert!(command.recording_duration().is_err());
    }

    #[test]
    fn test_half_pairs_are_ignored() {
        let command = StartRecordingCommand {
            delay_duration: Some(5),
            max_age_unit: Some(TimeUnit::Minutes),
            ..StartRecordingCommand::new(10, TimeUnit::Seconds)
        };
        assert_eq!(command.delay(), None);
        assert_eq!(command.max_age(), None);
        assert_eq!(
            command.recording_duration().unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_json_shape() {
        let command: StartRecordingCommand = serde_json::from_str(
            r#"{"duration":30,"timeUnit":"SECONDS","delayDuration":1,"delayUnit":"MINUTES","customSettings":{"a":"b"}}"#,
        )
        .unwrap();
        assert_eq!(command.delay(), Some(Duration::from_secs(60)));
        assert_eq!(
            command.custom_settings.unwrap().get("a").map(String::as_str),
            Some("b")
        );
        assert_eq!(command.description, None);
    }
}

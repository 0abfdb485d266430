//! Recording state and the public session view

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::identifiers::RecordingId;

/// Lifecycle state of a recording, as reported by the profiling engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingState {
    New,
    Delayed,
    Running,
    Stopped,
    Closed,
}

impl RecordingState {
    /// `STOPPED` or `CLOSED`
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Stopped | Self::Closed)
    }

    /// Upper-case name used in session listings
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Delayed => "DELAYED",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session info for listing responses
///
/// Timestamps are serialized in local time as `yyyy-MM-dd HH:mm:ss`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSession {
    /// Engine-assigned recording id
    pub id: RecordingId,

    /// When the recording started (None while NEW or DELAYED)
    #[serde(serialize_with = "local_timestamp")]
    pub started_at: Option<DateTime<Utc>>,

    /// Upper-case recording state
    pub status: RecordingState,

    /// When the recording stopped (only for STOPPED or CLOSED)
    #[serde(
        serialize_with = "local_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub finished_at: Option<DateTime<Utc>>,

    /// Description supplied by the creator
    pub description: String,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn local_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.collect_str(
            &ts.with_timezone(&Local).format(TIMESTAMP_FORMAT),
        ),
        None => serializer.serialize_none(),
    }
}

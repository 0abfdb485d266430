//! Capture events read from a recording file

use serde::{Deserialize, Serialize};

/// Event type of periodic stack samples; other events carry no call stacks of interest
pub const EXECUTION_SAMPLE: &str = "jdk.ExecutionSample";

/// One call frame of a sampled stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedFrame {
    /// Fully qualified owning type
    pub type_name: String,
    pub method_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    /// Native frames never appear in the graph
    #[serde(default)]
    pub native: bool,
}

impl RecordedFrame {
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            line_number: None,
            native: false,
        }
    }

    /// Stable identity used to merge frames: `type.method`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }
}

/// One recorded event; `frames` is innermost-first, as captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureEvent {
    pub event_type: String,
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
}

impl CaptureEvent {
    /// Execution sample with frames given innermost-first
    #[must_use]
    pub fn execution_sample(frames: Vec<RecordedFrame>) -> Self {
        Self {
            event_type: EXECUTION_SAMPLE.to_string(),
            frames,
        }
    }

    #[must_use]
    pub fn is_execution_sample(&self) -> bool {
        self.event_type == EXECUTION_SAMPLE
    }
}

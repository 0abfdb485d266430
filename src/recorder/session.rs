//! Session record held by the store

use crate::engine::Recording;
use crate::types::{RecordingId, RecordingState};

/// One tracked recording and the description it was created with
pub struct RecordingSession {
    recording: Box<dyn Recording>,
    description: String,
}

impl RecordingSession {
    pub fn new(recording: Box<dyn Recording>, description: impl Into<String>) -> Self {
        Self {
            recording,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> RecordingId {
        self.recording.id()
    }

    #[must_use]
    pub fn state(&self) -> RecordingState {
        self.recording.state()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn recording(&self) -> &dyn Recording {
        self.recording.as_ref()
    }

    pub fn recording_mut(&mut self) -> &mut dyn Recording {
        self.recording.as_mut()
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("description", &self.description)
            .finish()
    }
}

//! Metric-driven recording triggers
//!
//! A [`TriggerChecker`] polls every configured trigger on a schedule and
//! starts a recording when its expression turns true, keeping at most one
//! unfinished recording per trigger.

mod checker;
mod expression;
mod meter;

pub use checker::TriggerChecker;
pub use expression::{BinaryOp, Expr, ExpressionEvaluator, MeterExpressionEvaluator, parse};
pub use meter::{Measurement, MeterQuery, MetricSource, StaticMetricSource, TagFilter};

use std::path::PathBuf;

use crate::error::Result;
use crate::recorder::FlightRecorder;
use crate::types::{RecordingId, StartRecordingCommand};

/// Lifecycle operations the trigger engine needs
pub trait RecordingControl: Send + Sync {
    /// True for unknown ids and finished recordings
    fn is_recording_stopped(&self, id: RecordingId) -> bool;

    fn stop_recording(&self, id: RecordingId) -> Result<Option<PathBuf>>;

    fn start_recording_for(&self, command: &StartRecordingCommand) -> Result<RecordingId>;

    /// Stop `previous` if still running, then start a recording for `command`
    ///
    /// A failed stop is logged and does not block the start. Implementors
    /// backed by a shared store should do both steps under one lock.
    fn replace_recording(
        &self,
        previous: Option<RecordingId>,
        command: &StartRecordingCommand,
    ) -> Result<RecordingId> {
        if let Some(previous) = previous
            && let Err(e) = self.stop_recording(previous)
        {
            log::warn!("Failed to stop recording {previous}: {e}");
        }
        self.start_recording_for(command)
    }
}

impl RecordingControl for FlightRecorder {
    fn is_recording_stopped(&self, id: RecordingId) -> bool {
        FlightRecorder::is_recording_stopped(self, id)
    }

    fn stop_recording(&self, id: RecordingId) -> Result<Option<PathBuf>> {
        FlightRecorder::stop_recording(self, id)
    }

    fn start_recording_for(&self, command: &StartRecordingCommand) -> Result<RecordingId> {
        FlightRecorder::start_recording_for(self, command)
    }

    fn replace_recording(
        &self,
        previous: Option<RecordingId>,
        command: &StartRecordingCommand,
    ) -> Result<RecordingId> {
        FlightRecorder::replace_recording(self, previous, command)
    }
}

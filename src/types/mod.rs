//! Type definitions for the flight recorder
//!
//! - [`identifiers`] - Type-safe ID wrappers (`RecordingId`)
//! - [`time_unit`] - `(amount, unit)` conversions
//! - [`command`] - `StartRecordingCommand`
//! - [`session`] - Recording states and the public session view

pub mod command;
pub mod identifiers;
pub mod session;
pub mod time_unit;

pub use command::StartRecordingCommand;
pub use identifiers::RecordingId;
pub use session::{PublicSession, RecordingState};
pub use time_unit::TimeUnit;

//! Recording session management
//!
//! Provides `FlightRecorder` for creating, starting, stopping and deleting
//! profiling sessions, and for retiring finished ones under a TTL or count
//! budget.
//!
//! # Module Structure
//!
//! - `core` - `FlightRecorder` struct and constructors
//! - `store` - Lock-guarded `SessionStore`
//! - `session` - Session record structure
//! - `lifecycle` - Create, start, stop, delete
//! - `retention` - Cleanup sweeps
//! - `list` - Session views and flame graphs
//! - `helpers` - Settings merge, destination files, view projection

mod core;
mod helpers;
mod lifecycle;
mod list;
mod retention;
mod session;
mod store;

pub use self::core::FlightRecorder;
pub use session::RecordingSession;
pub use store::{SessionStore, StoreGuard};

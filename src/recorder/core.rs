//! Core flight recorder structure
//!
//! Provides the main `FlightRecorder` struct and its constructors. The
//! operations live in sibling modules:
//! - `lifecycle`: create, start, stop, delete
//! - `retention`: periodic cleanup of finished recordings
//! - `list`: session views and flame graphs

use std::sync::Arc;

use super::store::SessionStore;
use crate::config::SharedConfig;
use crate::engine::ProfilingEngine;

/// Name given to every recording allocated through the recorder
pub(crate) const RECORDING_NAME: &str = "Flight Recording";

/// Tracks profiling sessions on top of a [`ProfilingEngine`]
///
/// The `FlightRecorder` coordinates recordings, handling:
/// - Session lifecycle (create, start, stop, delete)
/// - Retention of finished recordings (TTL or count based)
/// - Public session views and flame graphs
///
/// All state lives in the [`SessionStore`]; the recorder itself only holds
/// handles and can be shared freely behind an `Arc`.
pub struct FlightRecorder {
    pub(crate) engine: Arc<dyn ProfilingEngine>,
    pub(crate) config: SharedConfig,
    pub(crate) store: Arc<SessionStore>,
}

impl FlightRecorder {
    /// Create a recorder with an empty store
    pub fn new(engine: Arc<dyn ProfilingEngine>, config: SharedConfig) -> Self {
        Self::with_store(engine, config, Arc::new(SessionStore::new()))
    }

    /// Create a recorder over an existing store
    pub fn with_store(
        engine: Arc<dyn ProfilingEngine>,
        config: SharedConfig,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            engine,
            config,
            store,
        }
    }

    /// Session store backing this recorder
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Shared configuration read by every operation
    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }
}

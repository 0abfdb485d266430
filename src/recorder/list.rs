//! Session listing and flame-graph views

use super::core::FlightRecorder;
use super::helpers::public_session;
use crate::error::Result;
use crate::flamegraph::{AllFrames, FlameGraph, PackagePrefixFilter};
use crate::types::{PublicSession, RecordingId};

impl FlightRecorder {
    /// All known sessions, ordered by id
    #[must_use]
    pub fn sessions(&self) -> Vec<PublicSession> {
        let mut result: Vec<PublicSession> = {
            let sessions = self.store.lock();
            sessions.values().map(public_session).collect()
        };
        result.sort_by_key(|session| session.id);
        result
    }

    /// One session, or `None` for unknown ids
    #[must_use]
    pub fn get_by_id(&self, id: RecordingId) -> Option<PublicSession> {
        self.store.lock().get(id).map(public_session)
    }

    /// Flame graph of a recording, restricted to the configured base package
    ///
    /// Stops the recording first if it is still running. Returns `None` for
    /// unknown ids or recordings without a destination file.
    pub fn flame_graph(&self, id: RecordingId) -> Result<Option<FlameGraph>> {
        let base_package = self.config.read().flame_graph_base_package.clone();
        let Some(path) = self.stop_recording(id)? else {
            return Ok(None);
        };

        log::info!("Building flame graph for recording {id}");
        let graph = match base_package {
            Some(prefix) => FlameGraph::from_file(&path, &PackagePrefixFilter::new(prefix))?,
            None => FlameGraph::from_file(&path, &AllFrames)?,
        };
        Ok(Some(graph))
    }

    /// Flame graph of a recording including every frame
    pub fn raw_flame_graph(&self, id: RecordingId) -> Result<Option<FlameGraph>> {
        let Some(path) = self.stop_recording(id)? else {
            return Ok(None);
        };

        log::info!("Building raw flame graph for recording {id}");
        FlameGraph::from_file(&path, &AllFrames).map(Some)
    }
}

//! Flame-graph aggregation
//!
//! Converts sampled call stacks into a rooted tree where each node counts
//! the samples passing through it. Stacks are captured innermost-first and
//! walked outermost-first, so the tree reads caller to callee.
//!
//! Frames rejected by the [`FrameFilter`] are skipped without breaking the
//! chain: with `A -> B -> C` and `B` excluded, `C` becomes a child of `A`.

mod event;
mod filter;
mod node;

pub use event::{CaptureEvent, EXECUTION_SAMPLE, RecordedFrame};
pub use filter::{AllFrames, FrameFilter, PackagePrefixFilter};
pub use node::Node;

use serde::Serialize;
use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Name of the root node
pub const ROOT_NAME: &str = "Recording";

/// Aggregated call tree; serializes as its root node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlameGraph {
    root: Node,
}

impl Default for FlameGraph {
    fn default() -> Self {
        Self {
            root: Node::new(ROOT_NAME),
        }
    }
}

impl FlameGraph {
    /// Aggregate events in order
    pub fn from_events<I>(events: I, filter: &dyn FrameFilter) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<CaptureEvent>,
    {
        let mut graph = Self::default();
        for event in events {
            graph.add_event(event.borrow(), filter);
        }
        graph
    }

    /// Aggregate a JSON-lines capture file, one [`CaptureEvent`] per non-empty line
    pub fn from_file(path: &Path, filter: &dyn FrameFilter) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut graph = Self::default();
        let mut events = 0usize;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: CaptureEvent = serde_json::from_str(&line)?;
            graph.add_event(&event, filter);
            events += 1;
        }

        log::debug!("Aggregated {} event(s) from {}", events, path.display());
        Ok(graph)
    }

    /// Add one event's stack to the tree
    pub fn add_event(&mut self, event: &CaptureEvent, filter: &dyn FrameFilter) {
        if !event.is_execution_sample() {
            return;
        }

        let mut current = &mut self.root;
        for frame in event.frames.iter().rev() {
            if !frame.native && filter.includes(&frame.type_name) {
                current = current.child_by_name(&frame.label());
            }
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }
}

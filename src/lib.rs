//! # Flight Recorder
//!
//! Session management for a sampling profiler: tracks profiling
//! recordings through their lifecycle, retires finished ones under a TTL or
//! count budget, starts new ones when metric-based triggers fire, and turns
//! captured call stacks into flame graphs.
//!
//! The sampler itself lives behind the [`ProfilingEngine`] trait; this crate
//! only decides when recordings start, stop and go away.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use kodegen_flight_recorder::{
//!     FlightRecorder, FlightRecorderConfig, FlightRecorderService, MeterExpressionEvaluator,
//!     ProfilingEngine, StaticMetricSource, TriggerChecker,
//! };
//!
//! # fn engine() -> Arc<dyn ProfilingEngine> { unimplemented!() }
//! # async fn example() -> kodegen_flight_recorder::Result<()> {
//! let config = FlightRecorderConfig::load("flight-recorder.toml")?.shared();
//! let recorder = Arc::new(FlightRecorder::new(engine(), Arc::clone(&config)));
//!
//! let checker = Arc::new(TriggerChecker::new(
//!     Arc::clone(&config),
//!     recorder.clone(),
//!     Arc::new(StaticMetricSource::new()),
//!     Arc::new(MeterExpressionEvaluator::new()),
//! ));
//!
//! let _service = FlightRecorderService::spawn(recorder, checker, config);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! recording-cleanup-type = "TTL"
//! old-recordings-ttl = 2
//! old-recordings-ttl-time-unit = "HOURS"
//!
//! [[trigger]]
//! expression = "meter('jvm.memory.used').tag('area','nonheap').measurement('value') > 100"
//! start-recording-command = { duration = 30, timeUnit = "SECONDS" }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod flamegraph;
pub mod recorder;
pub mod service;
pub mod trigger;
pub mod types;

pub use config::{CleanupType, FlightRecorderConfig, SharedConfig, Trigger};
pub use engine::{EngineConfiguration, ProfilingEngine, Recording, RecordingOptions, Settings};
pub use error::{FlightRecorderError, Result};
pub use flamegraph::{
    AllFrames, CaptureEvent, FlameGraph, FrameFilter, Node, PackagePrefixFilter, RecordedFrame,
};
pub use recorder::{FlightRecorder, RecordingSession, SessionStore};
pub use service::FlightRecorderService;
pub use trigger::{
    ExpressionEvaluator, Measurement, MeterExpressionEvaluator, MeterQuery, MetricSource,
    RecordingControl, StaticMetricSource, TriggerChecker,
};
pub use types::{PublicSession, RecordingId, RecordingState, StartRecordingCommand, TimeUnit};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

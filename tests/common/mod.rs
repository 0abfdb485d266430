//! Shared test helpers: an in-memory profiling engine that records every
//! call made on its recordings

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use kodegen_flight_recorder::{
    EngineConfiguration, FlightRecorder, FlightRecorderConfig, FlightRecorderError,
    ProfilingEngine, Recording, RecordingId, RecordingOptions, RecordingState, Result, Settings,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Call made on a mock recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Options,
    Start,
    Schedule(Duration),
    Stop,
    Close,
}

#[derive(Debug)]
pub struct RecordingProbe {
    pub name: String,
    pub settings: Settings,
    pub state: RecordingState,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    pub options: Option<RecordingOptions>,
    pub calls: Vec<Call>,
    pub fail_close: bool,
}

impl RecordingProbe {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

struct MockRecording {
    id: RecordingId,
    destination: Option<PathBuf>,
    probe: Arc<Mutex<RecordingProbe>>,
}

impl Recording for MockRecording {
    fn id(&self) -> RecordingId {
        self.id
    }

    fn state(&self) -> RecordingState {
        self.probe.lock().state
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        self.probe.lock().start_time
    }

    fn stop_time(&self) -> Option<DateTime<Utc>> {
        self.probe.lock().stop_time
    }

    fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    fn apply_options(&mut self, options: RecordingOptions) -> Result<()> {
        self.destination = Some(options.destination.clone());
        let mut probe = self.probe.lock();
        probe.calls.push(Call::Options);
        probe.options = Some(options);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut probe = self.probe.lock();
        probe.calls.push(Call::Start);
        probe.state = RecordingState::Running;
        probe.start_time = Some(Utc::now());
        Ok(())
    }

    fn schedule_start(&mut self, delay: Duration) -> Result<()> {
        let mut probe = self.probe.lock();
        probe.calls.push(Call::Schedule(delay));
        probe.state = RecordingState::Delayed;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut probe = self.probe.lock();
        probe.calls.push(Call::Stop);
        probe.state = RecordingState::Stopped;
        probe.stop_time = Some(Utc::now());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut probe = self.probe.lock();
        probe.calls.push(Call::Close);
        if probe.fail_close {
            return Err(FlightRecorderError::engine("close refused"));
        }
        probe.state = RecordingState::Closed;
        Ok(())
    }
}

/// Engine handing out [`MockRecording`]s with sequential ids from 1
#[derive(Default)]
pub struct MockEngine {
    next_id: AtomicU64,
    configurations: Vec<EngineConfiguration>,
    probes: Mutex<BTreeMap<RecordingId, Arc<Mutex<RecordingProbe>>>>,
    fail_allocate: AtomicBool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::with_configurations(vec![
            EngineConfiguration::new("default", settings(&[("jdk.ExecutionSample#period", "20 ms")])),
            EngineConfiguration::new("profile", settings(&[("jdk.ExecutionSample#period", "10 ms")])),
        ])
    }

    pub fn with_configurations(configurations: Vec<EngineConfiguration>) -> Self {
        Self {
            configurations,
            ..Self::default()
        }
    }

    pub fn probe(&self, id: RecordingId) -> Arc<Mutex<RecordingProbe>> {
        Arc::clone(
            self.probes
                .lock()
                .get(&id)
                .unwrap_or_else(|| panic!("no recording {id}")),
        )
    }

    pub fn calls(&self, id: RecordingId) -> Vec<Call> {
        self.probe(id).lock().calls.clone()
    }

    pub fn state(&self, id: RecordingId) -> RecordingState {
        self.probe(id).lock().state
    }

    pub fn settings(&self, id: RecordingId) -> Settings {
        self.probe(id).lock().settings.clone()
    }

    /// Force a recording into `state` as if the engine moved it there
    pub fn set_state(&self, id: RecordingId, state: RecordingState) {
        self.probe(id).lock().state = state;
    }

    pub fn set_start_time(&self, id: RecordingId, start_time: DateTime<Utc>) {
        self.probe(id).lock().start_time = Some(start_time);
    }

    pub fn fail_close(&self, id: RecordingId) {
        self.probe(id).lock().fail_close = true;
    }

    pub fn fail_allocations(&self) {
        self.fail_allocate.store(true, Ordering::SeqCst);
    }

    pub fn allocated(&self) -> usize {
        self.probes.lock().len()
    }
}

impl ProfilingEngine for MockEngine {
    fn configurations(&self) -> Vec<EngineConfiguration> {
        self.configurations.clone()
    }

    fn allocate(&self, name: &str, settings: Settings) -> Result<Box<dyn Recording>> {
        if self.fail_allocate.load(Ordering::SeqCst) {
            return Err(FlightRecorderError::engine("allocation refused"));
        }

        let id = RecordingId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let probe = Arc::new(Mutex::new(RecordingProbe {
            name: name.to_string(),
            settings,
            state: RecordingState::New,
            start_time: None,
            stop_time: None,
            options: None,
            calls: Vec::new(),
            fail_close: false,
        }));
        self.probes.lock().insert(id, Arc::clone(&probe));

        Ok(Box::new(MockRecording {
            id,
            destination: None,
            probe,
        }))
    }
}

pub fn settings(pairs: &[(&str, &str)]) -> Settings {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Recorder over a fresh [`MockEngine`]
pub fn recorder(config: FlightRecorderConfig) -> (Arc<MockEngine>, FlightRecorder) {
    init_logging();
    let engine = Arc::new(MockEngine::new());
    let recorder = FlightRecorder::new(engine.clone(), config.shared());
    (engine, recorder)
}

/// Config writing destination files into `dir`
pub fn config_in(dir: &Path) -> FlightRecorderConfig {
    FlightRecorderConfig {
        base_path: Some(dir.to_path_buf()),
        ..FlightRecorderConfig::default()
    }
}

/// Destination file of a recording that has had options applied
pub fn destination(engine: &MockEngine, id: RecordingId) -> PathBuf {
    engine
        .probe(id)
        .lock()
        .options
        .clone()
        .unwrap_or_else(|| panic!("recording {id} has no options"))
        .destination
}

/// Swap the file at `path` for a non-empty directory so unlinking it fails
pub fn block_removal(path: &Path) {
    std::fs::remove_file(path).unwrap();
    std::fs::create_dir(path).unwrap();
    std::fs::write(path.join("pinned"), b"x").unwrap();
}

/// Undo [`block_removal`], leaving nothing at `path`
pub fn unblock_removal(path: &Path) {
    std::fs::remove_dir_all(path).unwrap();
}

//! Trigger checking against a recording mock and against a real recorder

mod common;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use common::{config_in, init_logging, recorder};
use kodegen_flight_recorder::{
    FlightRecorderConfig, FlightRecorderError, MeterExpressionEvaluator, MetricSource,
    RecordingControl, RecordingId, RecordingState, Result, StartRecordingCommand,
    StaticMetricSource, TimeUnit, Trigger, TriggerChecker,
};

const HIGH_METASPACE: &str =
    "meter('jvm.memory.used').tag('area','nonheap').tag('id','Metaspace').measurement('value') > 100";

#[derive(Default)]
struct ControlMock {
    started: Mutex<Vec<StartRecordingCommand>>,
    stopped: Mutex<Vec<RecordingId>>,
    finished: Mutex<HashSet<RecordingId>>,
    status_checks: Mutex<usize>,
    fail_stop: bool,
}

impl ControlMock {
    fn interactions(&self) -> usize {
        self.started.lock().len() + self.stopped.lock().len() + *self.status_checks.lock()
    }

    fn finish(&self, id: RecordingId) {
        self.finished.lock().insert(id);
    }
}

impl RecordingControl for ControlMock {
    fn is_recording_stopped(&self, id: RecordingId) -> bool {
        *self.status_checks.lock() += 1;
        self.finished.lock().contains(&id)
    }

    fn stop_recording(&self, id: RecordingId) -> Result<Option<PathBuf>> {
        self.stopped.lock().push(id);
        if self.fail_stop {
            return Err(FlightRecorderError::engine("stop refused"));
        }
        Ok(None)
    }

    fn start_recording_for(&self, command: &StartRecordingCommand) -> Result<RecordingId> {
        let mut started = self.started.lock();
        started.push(command.clone());
        Ok(RecordingId::new(started.len() as u64))
    }
}

fn trigger(expression: &str) -> Trigger {
    Trigger {
        expression: expression.to_string(),
        start_recording_command: StartRecordingCommand::new(30, TimeUnit::Seconds),
    }
}

fn config_with(triggers: Vec<Trigger>) -> FlightRecorderConfig {
    FlightRecorderConfig {
        triggers,
        ..FlightRecorderConfig::default()
    }
}

fn metaspace(value: f64) -> Arc<StaticMetricSource> {
    let metrics = Arc::new(StaticMetricSource::new());
    metrics.set(
        "jvm.memory.used",
        &[("area", "nonheap"), ("id", "Metaspace")],
        "value",
        value,
    );
    metrics
}

fn checker(
    config: FlightRecorderConfig,
    control: Arc<ControlMock>,
    metrics: Arc<StaticMetricSource>,
) -> TriggerChecker {
    init_logging();
    TriggerChecker::new(
        config.shared(),
        control,
        metrics,
        Arc::new(MeterExpressionEvaluator::new()),
    )
}

#[test]
fn test_disabled_checker_never_touches_recordings() {
    let control = Arc::new(ControlMock::default());
    let config = FlightRecorderConfig {
        enabled: false,
        ..config_with(vec![trigger("true")])
    };
    let checker = checker(config, control.clone(), metaspace(500.0));

    checker.check();
    checker.check();

    assert_eq!(control.interactions(), 0);
    assert_eq!(checker.recording_for(0), None);
}

#[test]
fn test_active_recording_blocks_second_start() {
    let control = Arc::new(ControlMock::default());
    let checker = checker(
        config_with(vec![trigger(HIGH_METASPACE)]),
        control.clone(),
        metaspace(150.0),
    );

    checker.check();
    checker.check();

    assert_eq!(control.started.lock().len(), 1);
    assert!(control.stopped.lock().is_empty());
    assert_eq!(checker.recording_for(0), Some(RecordingId::new(1)));
}

#[test]
fn test_finished_recording_is_replaced() {
    let control = Arc::new(ControlMock::default());
    let checker = checker(
        config_with(vec![trigger(HIGH_METASPACE)]),
        control.clone(),
        metaspace(150.0),
    );

    checker.check();
    control.finish(RecordingId::new(1));
    checker.check();

    assert_eq!(control.started.lock().len(), 2);
    assert_eq!(*control.stopped.lock(), vec![RecordingId::new(1)]);
    assert_eq!(checker.recording_for(0), Some(RecordingId::new(2)));
}

#[test]
fn test_started_command_carries_expression_as_description() {
    let control = Arc::new(ControlMock::default());
    let checker = checker(
        config_with(vec![trigger(HIGH_METASPACE)]),
        control.clone(),
        metaspace(150.0),
    );

    checker.check();

    let started = control.started.lock();
    assert_eq!(started[0].description.as_deref(), Some(HIGH_METASPACE));
    assert_eq!(started[0].duration, Some(30));
}

#[test]
fn test_false_or_failing_expressions_start_nothing() {
    let control = Arc::new(ControlMock::default());
    let checker = checker(
        config_with(vec![
            trigger(HIGH_METASPACE),
            trigger("meter('jvm.memory.used').measurement('value') +"),
            trigger("42"),
        ]),
        control.clone(),
        metaspace(50.0),
    );
    assert_eq!(checker.trigger_count(), 3);

    checker.check();
    checker.check();

    assert!(control.started.lock().is_empty());
    assert!((0..3).all(|index| checker.recording_for(index).is_none()));
}

#[test]
fn test_stop_failure_does_not_block_replacement() {
    let control = Arc::new(ControlMock {
        fail_stop: true,
        ..ControlMock::default()
    });
    let checker = checker(config_with(vec![trigger("true")]), control.clone(), metaspace(0.0));

    checker.check();
    control.finish(RecordingId::new(1));
    checker.check();

    assert_eq!(control.started.lock().len(), 2);
    assert_eq!(checker.recording_for(0), Some(RecordingId::new(2)));
}

#[test]
fn test_triggers_are_tracked_independently() {
    let control = Arc::new(ControlMock::default());
    let metrics = metaspace(150.0);
    let checker = checker(
        config_with(vec![trigger(HIGH_METASPACE), trigger("true")]),
        control.clone(),
        metrics,
    );

    checker.check();
    control.finish(RecordingId::new(2));
    checker.check();

    assert_eq!(checker.recording_for(0), Some(RecordingId::new(1)));
    assert_eq!(checker.recording_for(1), Some(RecordingId::new(3)));
    assert_eq!(*control.stopped.lock(), vec![RecordingId::new(2)]);
}

#[test]
fn test_trigger_drives_real_recorder() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, recorder) = recorder(config_with(vec![trigger(HIGH_METASPACE)]));
    let recorder = Arc::new(recorder);
    recorder.config().write().base_path = config_in(dir.path()).base_path;

    let metrics = metaspace(50.0);
    let checker = TriggerChecker::new(
        Arc::clone(recorder.config()),
        recorder.clone(),
        metrics.clone() as Arc<dyn MetricSource>,
        Arc::new(MeterExpressionEvaluator::new()),
    );

    checker.check();
    assert!(recorder.sessions().is_empty());

    metrics.set(
        "jvm.memory.used",
        &[("area", "nonheap"), ("id", "Metaspace")],
        "value",
        250.0,
    );
    checker.check();
    let first = checker.recording_for(0).unwrap();
    assert_eq!(engine.state(first), RecordingState::Running);
    assert_eq!(recorder.get_by_id(first).unwrap().description, HIGH_METASPACE);

    checker.check();
    assert_eq!(recorder.sessions().len(), 1);

    engine.set_state(first, RecordingState::Stopped);
    checker.check();
    let second = checker.recording_for(0).unwrap();
    assert_ne!(first, second);
    assert_eq!(recorder.sessions().len(), 2);
}

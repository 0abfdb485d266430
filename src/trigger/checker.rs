//! Periodic trigger evaluation
//!
//! The slot lock serializes whole checks, so one trigger never has two
//! replacements in flight. The store lock is not held across a check:
//! the status read and the stop-and-start replacement are two separate
//! operations on the recorder, and metrics are evaluated between them
//! with no recorder lock held. A recording can only move towards finished
//! in that window, which at worst delays a replacement to the next check.

use parking_lot::Mutex;
use std::sync::Arc;

use super::RecordingControl;
use super::expression::ExpressionEvaluator;
use super::meter::MetricSource;
use crate::config::{SharedConfig, Trigger};
use crate::types::RecordingId;

struct TriggerSlot {
    trigger: Trigger,
    /// Last recording started by this trigger; `None` until the first start
    latest: Option<RecordingId>,
}

/// Evaluates configured triggers and starts recordings when they fire
pub struct TriggerChecker {
    config: SharedConfig,
    control: Arc<dyn RecordingControl>,
    metrics: Arc<dyn MetricSource>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    slots: Mutex<Vec<TriggerSlot>>,
}

impl TriggerChecker {
    /// Register the triggers found in `config`
    ///
    /// Expressions are parsed once here. A trigger whose expression does
    /// not parse is still registered and fails evaluation on every check.
    pub fn new(
        config: SharedConfig,
        control: Arc<dyn RecordingControl>,
        metrics: Arc<dyn MetricSource>,
        evaluator: Arc<dyn ExpressionEvaluator>,
    ) -> Self {
        let triggers = config.read().triggers.clone();
        let slots = triggers
            .into_iter()
            .map(|trigger| {
                log::info!("Registering trigger '{}'", trigger.expression);
                if let Err(e) = evaluator.validate(&trigger.expression) {
                    log::warn!("Trigger will never fire: {e}");
                }
                TriggerSlot {
                    trigger,
                    latest: None,
                }
            })
            .collect();

        Self {
            config,
            control,
            metrics,
            evaluator,
            slots: Mutex::new(slots),
        }
    }

    /// Run one round over all triggers
    ///
    /// Does nothing while the recorder is disabled. A trigger whose last
    /// recording is still unfinished is not evaluated.
    pub fn check(&self) {
        if !self.config.read().enabled {
            return;
        }

        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            self.check_slot(slot);
        }
    }

    fn check_slot(&self, slot: &mut TriggerSlot) {
        if let Some(id) = slot.latest
            && !self.control.is_recording_stopped(id)
        {
            return;
        }

        let expression = &slot.trigger.expression;
        let fired = match self.evaluator.evaluate(expression, self.metrics.as_ref()) {
            Ok(fired) => fired,
            Err(e) => {
                log::warn!("Trigger evaluation failed: {e}");
                false
            }
        };
        if !fired {
            return;
        }

        log::info!("Trigger '{expression}' fired");
        let command = slot
            .trigger
            .start_recording_command
            .clone()
            .with_description(expression.clone());
        match self.control.replace_recording(slot.latest, &command) {
            Ok(id) => slot.latest = Some(id),
            Err(e) => log::warn!("Trigger '{expression}' failed to start a recording: {e}"),
        }
    }

    /// Last recording started by the trigger at `index`
    #[must_use]
    pub fn recording_for(&self, index: usize) -> Option<RecordingId> {
        self.slots.lock().get(index).and_then(|slot| slot.latest)
    }

    #[must_use]
    pub fn trigger_count(&self) -> usize {
        self.slots.lock().len()
    }
}

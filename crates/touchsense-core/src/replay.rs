//! Replay contact scripts through a classifier on a virtual clock.
//!
//! A script is the recorded form of a contact stream: timed start/move/end
//! samples. Replaying fires every timer at its own deadline before the next
//! sample, so recorded gestures carry the instant they would have fired on a
//! live surface.

use crate::error::{BindError, DispatchError};
use crate::event::{ContactEvent, ContactPhase, RawContact};
use crate::registry::callback;
use crate::{Classifier, ClassifierConfig, GestureKind, HandlerOptions, Surface};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// One timed sample in a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactStep {
    /// Milliseconds since the start of the script.
    pub at_ms: u64,
    pub phase: ContactPhase,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl ContactStep {
    pub fn raw(&self) -> RawContact {
        RawContact {
            phase: self.phase,
            event: ContactEvent::new(self.at_ms, self.x, self.y),
        }
    }
}

/// A recorded contact stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactScript {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ContactStep>,
    /// Keep the clock running until this instant after the last step so
    /// trailing timers (a held long touch, an open window) can fire.
    #[serde(default)]
    pub until_ms: Option<u64>,
}

impl ContactScript {
    pub fn new(steps: Vec<ContactStep>) -> Self {
        Self {
            name: None,
            steps,
            until_ms: None,
        }
    }

    /// Steps sorted by time. Equal timestamps keep their recorded order.
    fn ordered_steps(&self) -> Vec<ContactStep> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|step| step.at_ms);
        steps
    }
}

/// A gesture observed during replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureRecord {
    /// Virtual time at which the gesture fired.
    pub at_ms: u64,
    pub kind: GestureKind,
    /// Payload handed to the handlers.
    pub event: ContactEvent,
}

/// Drives a classifier from scripts and records every gesture it emits.
pub struct Replayer {
    classifier: Classifier<ContactEvent>,
    clock: Arc<AtomicU64>,
    records: Arc<Mutex<Vec<GestureRecord>>>,
}

impl Replayer {
    /// Bind a recording classifier to `surface`.
    ///
    /// `vibrate_on` lists the kinds whose recording handler requests a
    /// haptic pulse.
    pub fn bind(
        surface: Arc<dyn Surface>,
        config: ClassifierConfig,
        vibrate_on: &[GestureKind],
    ) -> Result<Self, BindError> {
        let mut classifier = Classifier::bind_with_config(surface, config)?;
        let clock = Arc::new(AtomicU64::new(0));
        let records = Arc::new(Mutex::new(Vec::new()));

        for kind in GestureKind::ALL {
            let clock = clock.clone();
            let records = records.clone();
            let options = vibrate_on
                .contains(&kind)
                .then(HandlerOptions::vibrate);
            classifier.register(
                kind,
                Some(callback(move |event: &ContactEvent, _| {
                    if let Ok(mut records) = records.lock() {
                        records.push(GestureRecord {
                            at_ms: clock.load(Ordering::SeqCst),
                            kind,
                            event: *event,
                        });
                    }
                    Ok(())
                })),
                options,
            );
        }

        Ok(Self {
            classifier,
            clock,
            records,
        })
    }

    pub fn classifier(&self) -> &Classifier<ContactEvent> {
        &self.classifier
    }

    /// Mutable access, e.g. to register extra handlers.
    pub fn classifier_mut(&mut self) -> &mut Classifier<ContactEvent> {
        &mut self.classifier
    }

    /// Run timers up to and including `now`, each at its own deadline.
    /// Every due timer runs; the first failure is returned.
    fn run_timers_until(&mut self, now: u64) -> Result<(), DispatchError> {
        let mut first_err = Ok(());
        while let Some(deadline) = self.classifier.next_deadline() {
            if deadline > now {
                break;
            }
            self.clock.store(deadline, Ordering::SeqCst);
            let result = self.classifier.advance(deadline);
            if first_err.is_ok() {
                first_err = result;
            }
        }
        first_err
    }

    /// Deliver one raw sample.
    ///
    /// The sample is handled even if a timer that came due before it failed.
    pub fn step(&mut self, raw: RawContact) -> Result<(), DispatchError> {
        let now = raw.event.timestamp_ms;
        let timers = self.run_timers_until(now);
        self.clock.store(now, Ordering::SeqCst);
        debug!(now, phase = ?raw.phase, "replaying contact");
        let result = self.classifier.handle(raw);
        timers.and(result)
    }

    /// Replay a whole script and return the gestures it produced.
    ///
    /// The first handler failure stops the replay.
    pub fn run(&mut self, script: &ContactScript) -> Result<Vec<GestureRecord>, DispatchError> {
        let before = self.records.lock().map(|r| r.len()).unwrap_or(0);

        for step in script.ordered_steps() {
            self.step(step.raw())?;
        }
        if let Some(until) = script.until_ms {
            self.run_timers_until(until)?;
        }

        let records = self
            .records
            .lock()
            .map(|r| r[before..].to_vec())
            .unwrap_or_default();
        info!(
            script = script.name.as_deref().unwrap_or("<unnamed>"),
            steps = script.steps.len(),
            gestures = records.len(),
            "replay finished"
        );
        Ok(records)
    }

    /// Every gesture recorded so far.
    pub fn records(&self) -> Vec<GestureRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Kinds only, in firing order.
pub fn kinds(records: &[GestureRecord]) -> Vec<GestureKind> {
    records.iter().map(|record| record.kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestSurface;
    use GestureKind::*;

    fn step(at_ms: u64, phase: ContactPhase) -> ContactStep {
        ContactStep {
            at_ms,
            phase,
            x: 10.0,
            y: 20.0,
        }
    }

    fn replayer() -> Replayer {
        Replayer::bind(
            Arc::new(TestSurface::renderable()),
            ClassifierConfig::default(),
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_tap_then_double_tap() {
        let script = ContactScript::new(vec![
            step(0, ContactPhase::Start),
            step(100, ContactPhase::End),
            step(200, ContactPhase::Start),
            step(250, ContactPhase::End),
        ]);
        let records = replayer().run(&script).unwrap();
        assert_eq!(kinds(&records), vec![Touch, Tap, Touch, DoubleTap, Tap]);
        assert_eq!(records[3].at_ms, 200);
    }

    #[test]
    fn test_move_then_hold_emits_touch_only() {
        let script = ContactScript::new(vec![
            step(0, ContactPhase::Start),
            step(50, ContactPhase::Move),
            step(900, ContactPhase::End),
        ]);
        assert_eq!(kinds(&replayer().run(&script).unwrap()), vec![Touch]);
    }

    #[test]
    fn test_long_touch_records_fire_time() {
        let script = ContactScript::new(vec![
            step(100, ContactPhase::Start),
            step(1_000, ContactPhase::Move),
            step(1_200, ContactPhase::End),
        ]);
        let records = replayer().run(&script).unwrap();
        assert_eq!(
            kinds(&records),
            vec![Touch, LongTouch, DragStart, Drag, DragEnd]
        );
        assert_eq!(records[1].at_ms, 900);
        assert_eq!(records[1].event.timestamp_ms, 100);
        assert_eq!(records[3].at_ms, 1_000);
    }

    #[test]
    fn test_until_fires_trailing_long_touch() {
        let mut script = ContactScript::new(vec![step(0, ContactPhase::Start)]);
        assert_eq!(kinds(&replayer().run(&script).unwrap()), vec![Touch]);

        script.until_ms = Some(800);
        assert_eq!(
            kinds(&replayer().run(&script).unwrap()),
            vec![Touch, LongTouch, DragStart]
        );
    }

    #[test]
    fn test_unsorted_steps_are_ordered() {
        let script = ContactScript::new(vec![
            step(100, ContactPhase::End),
            step(0, ContactPhase::Start),
        ]);
        assert_eq!(kinds(&replayer().run(&script).unwrap()), vec![Touch, Tap]);
    }

    #[test]
    fn test_vibrate_on_selected_kinds() {
        let surface = Arc::new(TestSurface::renderable());
        let mut replayer =
            Replayer::bind(surface.clone(), ClassifierConfig::default(), &[Tap]).unwrap();
        let script = ContactScript::new(vec![
            step(0, ContactPhase::Start),
            step(10, ContactPhase::End),
        ]);
        replayer.run(&script).unwrap();
        assert_eq!(surface.pulses(), vec![vec![30]]);
    }

    #[test]
    fn test_failed_long_touch_still_delivers_release() {
        let mut replayer = replayer();
        replayer
            .classifier_mut()
            .on_long_touch(|_, _| Err("boom".into()), None);

        replayer.step(RawContact::start(0, 1.0, 1.0)).unwrap();
        let err = replayer.step(RawContact::end(900, 1.0, 1.0)).unwrap_err();

        assert_eq!(err.kind, LongTouch);
        assert_eq!(kinds(&replayer.records()), vec![Touch, LongTouch, Tap]);
        assert!(!replayer.classifier().state().is_touching);
    }

    #[test]
    fn test_script_from_yaml() {
        let yaml = r#"
name: double
steps:
  - { at_ms: 0, phase: start }
  - { at_ms: 80, phase: end, x: 3.5 }
until_ms: 500
"#;
        let script: ContactScript = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(script.name.as_deref(), Some("double"));
        assert_eq!(script.steps[1].phase, ContactPhase::End);
        assert_eq!(script.steps[1].x, 3.5);
        assert_eq!(script.until_ms, Some(500));
    }
}

//! Timer driver for [`Stepper`].
//!
//! The driver owns the ticking: one tokio task per run advances the stepper
//! every tick interval and publishes a [`StepperSnapshot`] to subscribers.
//! Every flag transition aborts the previous run's task, and each tick is
//! checked against the current run id, so a stale task can never move a
//! newer run.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, trace};
use vendorboard_core::{PhaseSequence, RunId};

use crate::stepper::{ProgressWeighting, Stepper, StepperEvent, StepperSnapshot};

/// Default tick interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Stepper driver configuration.
#[derive(Debug, Clone)]
pub struct StepperConfig {
    /// How often progress is recomputed
    pub tick: Duration,

    /// Progress weighting
    pub weighting: ProgressWeighting,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            weighting: ProgressWeighting::default(),
        }
    }
}

/// Called once when a run reaches its last phase's end.
pub type CompletionCallback = Arc<dyn Fn(RunId) + Send + Sync>;

struct Shared {
    stepper: Mutex<Stepper>,
    updates: watch::Sender<StepperSnapshot>,
    on_complete: Option<CompletionCallback>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Stepper> {
        self.stepper.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, snapshot: StepperSnapshot) {
        self.updates.send_replace(snapshot);
    }
}

/// Drives a [`Stepper`] from an external `active` flag.
///
/// Must be used from within a tokio runtime: activation spawns the tick task.
pub struct StepperDriver {
    shared: Arc<Shared>,
    tick: Duration,
    active: Mutex<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StepperDriver {
    /// Create a driver over `phases`.
    pub fn new(phases: PhaseSequence, config: StepperConfig) -> Self {
        Self::build(phases, config, None)
    }

    /// Create a driver that invokes `on_complete` when a run finishes.
    pub fn with_completion(
        phases: PhaseSequence,
        config: StepperConfig,
        on_complete: impl Fn(RunId) + Send + Sync + 'static,
    ) -> Self {
        Self::build(phases, config, Some(Arc::new(on_complete)))
    }

    fn build(
        phases: PhaseSequence,
        config: StepperConfig,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let stepper = Stepper::new(phases).with_weighting(config.weighting);
        let (updates, _) = watch::channel(stepper.snapshot());
        Self {
            shared: Arc::new(Shared {
                stepper: Mutex::new(stepper),
                updates,
                on_complete,
            }),
            tick: config.tick,
            active: Mutex::new(false),
            task: Mutex::new(None),
        }
    }

    /// Current value of the external flag.
    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply the external `active` flag.
    ///
    /// Only transitions act: false → true starts a run, true → false cancels
    /// it and resets to idle. Setting the current value again does nothing.
    pub fn set_active(&self, active: bool) {
        let changed = {
            let mut flag = self.active.lock().unwrap_or_else(|e| e.into_inner());
            let changed = *flag != active;
            *flag = active;
            changed
        };
        if !changed {
            return;
        }

        if active {
            self.start_run();
        } else {
            self.cancel_task();
            let snapshot = {
                let mut stepper = self.shared.lock();
                stepper.deactivate();
                stepper.snapshot()
            };
            self.shared.publish(snapshot);
        }
    }

    /// Cancel any run and start a fresh one, leaving the flag set.
    pub fn restart(&self) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = true;
        self.start_run();
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> StepperSnapshot {
        self.shared.lock().snapshot()
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StepperSnapshot> {
        self.shared.updates.subscribe()
    }

    fn start_run(&self) {
        self.cancel_task();

        let (run_id, snapshot) = {
            let mut stepper = self.shared.lock();
            let (run_id, _) = stepper.activate();
            (run_id, stepper.snapshot())
        };
        self.shared.publish(snapshot);

        let shared = Arc::clone(&self.shared);
        let tick = self.tick;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            loop {
                ticker.tick().await;

                let (events, snapshot) = {
                    let mut stepper = shared.lock();
                    if stepper.run_id() != Some(run_id) {
                        trace!(%run_id, "dropping tick from stale run");
                        return;
                    }
                    let events = stepper.advance(tick);
                    (events, stepper.snapshot())
                };
                shared.publish(snapshot);

                for event in events {
                    match event {
                        StepperEvent::PhaseCompleted { index, id } => {
                            debug!(%run_id, index, phase = %id, "phase completed");
                        }
                        StepperEvent::Finished { run_id } => {
                            if let Some(callback) = &shared.on_complete {
                                callback(run_id);
                            }
                            return;
                        }
                        _ => {}
                    }
                }
            }
        });

        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    fn cancel_task(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}

impl Drop for StepperDriver {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

//! Staged progress state machine.
//!
//! [`Stepper`] walks a [`PhaseSequence`] on an externally supplied clock:
//! callers feed it elapsed time through [`Stepper::advance`] and read back
//! the events and progress that result. It owns no timers, which keeps every
//! transition deterministic and testable without a runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vendorboard_core::{PhaseSequence, PhaseStatus, RunId};

/// How overall progress is derived from the current phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressWeighting {
    /// Every phase is worth the same share: `100 * (i + frac) / N`.
    #[default]
    PerPhase,
    /// Phases are weighted by their nominal duration.
    ByDuration,
}

/// Lifecycle state of a stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepperState {
    /// No run in progress
    Idle,
    /// Running the phase at `index`
    Running {
        /// Index of the active phase
        index: usize,
    },
    /// Every phase elapsed
    Finished,
}

/// Something that happened while advancing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepperEvent {
    /// A new run began
    RunStarted {
        /// The new run
        run_id: RunId,
    },
    /// A phase became active
    PhaseStarted {
        /// Phase index
        index: usize,
        /// Phase id
        id: String,
    },
    /// A phase's nominal duration elapsed
    PhaseCompleted {
        /// Phase index
        index: usize,
        /// Phase id
        id: String,
    },
    /// The last phase elapsed; emitted once per run
    Finished {
        /// The finished run
        run_id: RunId,
    },
}

/// Point-in-time view of a stepper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepperSnapshot {
    /// Current run, if any
    pub run_id: Option<RunId>,

    /// Lifecycle state
    pub state: StepperState,

    /// 0..=N; N means finished
    pub current_index: usize,

    /// Completed phase ids in completion order
    pub completed: Vec<String>,

    /// Time spent in the current phase
    pub elapsed_in_phase: Duration,

    /// Overall progress, 0-100
    pub progress: f64,

    /// Status of every phase, in sequence order
    pub phases: Vec<(String, PhaseStatus)>,
}

impl StepperSnapshot {
    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        matches!(self.state, StepperState::Running { .. })
    }

    /// Progress rounded for display.
    pub fn percent(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }
}

/// Timer-free phase state machine.
#[derive(Debug, Clone)]
pub struct Stepper {
    phases: PhaseSequence,
    weighting: ProgressWeighting,
    run_id: Option<RunId>,
    state: StepperState,
    completed: Vec<String>,
    elapsed: Duration,
}

impl Stepper {
    /// Create an idle stepper over `phases`.
    pub fn new(phases: PhaseSequence) -> Self {
        Self {
            phases,
            weighting: ProgressWeighting::default(),
            run_id: None,
            state: StepperState::Idle,
            completed: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Set the progress weighting.
    pub fn with_weighting(mut self, weighting: ProgressWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Phases this stepper walks.
    pub fn phases(&self) -> &PhaseSequence {
        &self.phases
    }

    /// Current state.
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Current run id.
    pub fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    /// Start a fresh run at phase 0, discarding any previous run.
    pub fn activate(&mut self) -> (RunId, Vec<StepperEvent>) {
        let run_id = RunId::new();
        self.run_id = Some(run_id);
        self.state = StepperState::Running { index: 0 };
        self.completed.clear();
        self.elapsed = Duration::ZERO;

        debug!(%run_id, phases = self.phases.len(), "stepper run started");

        let first = self.phases.get(0).map(|p| p.id.clone()).unwrap_or_default();
        (
            run_id,
            vec![
                StepperEvent::RunStarted { run_id },
                StepperEvent::PhaseStarted { index: 0, id: first },
            ],
        )
    }

    /// Return to idle, clearing all run state. No events are emitted.
    pub fn deactivate(&mut self) {
        if let Some(run_id) = self.run_id.take() {
            debug!(%run_id, state = ?self.state, "stepper reset");
        }
        self.state = StepperState::Idle;
        self.completed.clear();
        self.elapsed = Duration::ZERO;
    }

    /// Feed `dt` of elapsed time into the current run.
    ///
    /// Time left over after a phase completes carries into the next one, so a
    /// single call may cross several phase boundaries. Outside a run this is
    /// a no-op.
    pub fn advance(&mut self, dt: Duration) -> Vec<StepperEvent> {
        let mut events = Vec::new();
        let mut remaining = dt;

        while let StepperState::Running { index } = self.state {
            let Some(phase) = self.phases.get(index) else {
                break;
            };
            let left = phase.duration.saturating_sub(self.elapsed);
            if remaining < left {
                self.elapsed += remaining;
                break;
            }

            remaining -= left;
            self.elapsed = Duration::ZERO;
            self.completed.push(phase.id.clone());
            events.push(StepperEvent::PhaseCompleted {
                index,
                id: phase.id.clone(),
            });

            let next = index + 1;
            match self.phases.get(next) {
                Some(next_phase) => {
                    self.state = StepperState::Running { index: next };
                    events.push(StepperEvent::PhaseStarted {
                        index: next,
                        id: next_phase.id.clone(),
                    });
                }
                None => {
                    self.state = StepperState::Finished;
                    if let Some(run_id) = self.run_id {
                        debug!(%run_id, "stepper run finished");
                        events.push(StepperEvent::Finished { run_id });
                    }
                }
            }
        }

        events
    }

    /// Index of the active phase; N when finished, 0 when idle.
    pub fn current_index(&self) -> usize {
        match self.state {
            StepperState::Idle => 0,
            StepperState::Running { index } => index,
            StepperState::Finished => self.phases.len(),
        }
    }

    /// Completed phase ids in completion order.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Overall progress, 0-100. Exactly 100 only once finished.
    pub fn progress(&self) -> f64 {
        let index = match self.state {
            StepperState::Idle => return 0.0,
            StepperState::Finished => return 100.0,
            StepperState::Running { index } => index,
        };
        let Some(phase) = self.phases.get(index) else {
            return 0.0;
        };

        let value = match self.weighting {
            ProgressWeighting::PerPhase => {
                let frac = (self.elapsed.as_secs_f64() / phase.duration.as_secs_f64()).min(1.0);
                100.0 * (index as f64 + frac) / self.phases.len() as f64
            }
            ProgressWeighting::ByDuration => {
                let done = self.phases.duration_before(index) + self.elapsed.min(phase.duration);
                100.0 * done.as_secs_f64() / self.phases.total_duration().as_secs_f64()
            }
        };
        value.clamp(0.0, 100.0)
    }

    /// Status of the phase at `index`.
    pub fn phase_status(&self, index: usize) -> PhaseStatus {
        match self.state {
            StepperState::Running { index: current } if index == current => PhaseStatus::Active,
            _ if index < self.completed.len() => PhaseStatus::Completed,
            _ => PhaseStatus::Pending,
        }
    }

    /// Status of every phase, in sequence order.
    pub fn phase_statuses(&self) -> Vec<(String, PhaseStatus)> {
        self.phases
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), self.phase_status(i)))
            .collect()
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> StepperSnapshot {
        StepperSnapshot {
            run_id: self.run_id,
            state: self.state,
            current_index: self.current_index(),
            completed: self.completed.clone(),
            elapsed_in_phase: self.elapsed,
            progress: self.progress(),
            phases: self.phase_statuses(),
        }
    }
}

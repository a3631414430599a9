//! Analysis progress (Layer 2)
//!
//! Timer-driven simulation of the multi-phase analysis pipeline: a pure
//! phase state machine plus the tokio driver that ticks it.

#![warn(missing_docs)]

pub mod stepper;
pub mod driver;

pub use stepper::{Stepper, StepperEvent, StepperSnapshot, StepperState, ProgressWeighting};
pub use driver::{StepperDriver, StepperConfig, CompletionCallback, DEFAULT_TICK};

//! Phase model - named stages of the simulated analysis pipeline.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Visual tag shown next to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseIcon {
    /// Source repository
    Repository,
    /// Model reasoning
    Reasoning,
    /// Stored results
    Database,
    /// Final checklist
    Checklist,
}

/// One stage of the analysis pipeline with a fixed nominal duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Unique identifier within its sequence
    pub id: String,

    /// Display title
    pub title: String,

    /// Display description
    pub description: String,

    /// Nominal duration
    pub duration: Duration,

    /// Visual tag
    pub icon: PhaseIcon,
}

impl PhaseSpec {
    /// Create a phase.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        duration: Duration,
        icon: PhaseIcon,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            duration,
            icon,
        }
    }
}

/// Status of a phase within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Not reached yet
    Pending,
    /// Currently running
    Active,
    /// Finished in this run
    Completed,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseStatus::Pending => write!(f, "pending"),
            PhaseStatus::Active => write!(f, "active"),
            PhaseStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Errors raised when building a phase sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    /// No phases given
    #[error("phase sequence is empty")]
    Empty,

    /// A phase has a zero duration
    #[error("phase '{0}' has a zero duration")]
    ZeroDuration(String),

    /// Two phases share an id
    #[error("duplicate phase id '{0}'")]
    DuplicateId(String),
}

/// Ordered, validated list of phases.
///
/// Built once and never mutated: durations are positive and ids unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSequence {
    phases: Vec<PhaseSpec>,
}

impl PhaseSequence {
    /// Validate and wrap a list of phases.
    pub fn new(phases: Vec<PhaseSpec>) -> Result<Self, PhaseError> {
        if phases.is_empty() {
            return Err(PhaseError::Empty);
        }

        let mut seen = HashSet::new();
        for phase in &phases {
            if phase.duration.is_zero() {
                return Err(PhaseError::ZeroDuration(phase.id.clone()));
            }
            if !seen.insert(phase.id.as_str()) {
                return Err(PhaseError::DuplicateId(phase.id.clone()));
            }
        }

        Ok(Self { phases })
    }

    /// The four-stage repository analysis pipeline.
    pub fn analysis() -> Self {
        Self {
            phases: vec![
                PhaseSpec::new(
                    "ingesting",
                    "Ingesting Repository",
                    "Cloning and analyzing repository structure...",
                    Duration::from_secs(12),
                    PhaseIcon::Repository,
                ),
                PhaseSpec::new(
                    "analyzing",
                    "Analyzing Code",
                    "AI is examining code against assessment criteria...",
                    Duration::from_secs(60),
                    PhaseIcon::Reasoning,
                ),
                PhaseSpec::new(
                    "processing",
                    "Processing Results",
                    "Calculating scores and generating insights...",
                    Duration::from_secs(6),
                    PhaseIcon::Database,
                ),
                PhaseSpec::new(
                    "finalizing",
                    "Finalizing Analysis",
                    "Saving results and preparing summary...",
                    Duration::from_secs(2),
                    PhaseIcon::Checklist,
                ),
            ],
        }
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase at `index`.
    pub fn get(&self, index: usize) -> Option<&PhaseSpec> {
        self.phases.get(index)
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PhaseSpec> {
        self.phases.iter()
    }

    /// Sum of nominal durations.
    pub fn total_duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }

    /// Sum of nominal durations of the phases before `index`.
    pub fn duration_before(&self, index: usize) -> Duration {
        self.phases.iter().take(index).map(|p| p.duration).sum()
    }
}

impl Default for PhaseSequence {
    fn default() -> Self {
        Self::analysis()
    }
}

impl<'a> IntoIterator for &'a PhaseSequence {
    type Item = &'a PhaseSpec;
    type IntoIter = std::slice::Iter<'a, PhaseSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

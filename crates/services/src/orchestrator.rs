//! Analysis orchestration.
//!
//! Runs the remote analyze call with the progress stepper as a cosmetic
//! overlay, keeps the latest result for the view, and refreshes the
//! dependent reads once the call resolves. The stepper and the call run on
//! independent clocks: the stepper may finish before the call returns, and
//! the call may return while the stepper is still mid-run.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use vendorboard_cache::{keys, Mutation};
use vendorboard_client::{ApiError, DEFAULT_ANALYZE_TIMEOUT};
use vendorboard_core::{
    validation, AnalysisResult, AnalyzeRequest, AssessmentId, AssessmentResults,
    NotImplementedItems, Notification, StatusUpdateResult, UpdateStatusRequest, ValidationError,
    UNKNOWN_ERROR,
};
use vendorboard_progress::StepperDriver;

use crate::context::ServiceContext;
use crate::error::Result;

/// Generic analysis failure text.
pub const ANALYSIS_FAILED: &str = "Failed to complete assessment analysis. Please try again.";

/// Generic status update failure text.
pub const STATUS_UPDATE_FAILED: &str = "Failed to update item statuses. Please try again.";

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on one analyze call
    pub analyze_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analyze_timeout: DEFAULT_ANALYZE_TIMEOUT,
        }
    }
}

/// How an analysis run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Server analyzed the repository
    Completed(AnalysisResult),

    /// Server answered but reported failure
    Reported(AnalysisResult),

    /// Call failed or timed out
    Failed(ApiError),

    /// The view was detached before the call resolved
    Discarded,
}

/// How a status threshold update ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Statuses recomputed
    Updated(StatusUpdateResult),

    /// Server answered but reported failure
    Rejected(String),

    /// Call failed
    Failed(ApiError),

    /// The view was detached before the call resolved
    Discarded,
}

#[derive(Default)]
struct ViewState {
    last_result: Option<AnalysisResult>,
    generation: u64,
    pending: usize,
}

/// Coordinates analysis runs for one view.
pub struct AnalysisOrchestrator {
    ctx: ServiceContext,
    config: OrchestratorConfig,
    stepper: Option<Arc<StepperDriver>>,
    view: Mutex<ViewState>,
    results: watch::Sender<Option<AnalysisResult>>,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator without a progress overlay.
    pub fn new(ctx: ServiceContext) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            ctx,
            config: OrchestratorConfig::default(),
            stepper: None,
            view: Mutex::new(ViewState::default()),
            results,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive `stepper` while analyze calls are pending.
    pub fn with_stepper(mut self, stepper: Arc<StepperDriver>) -> Self {
        self.stepper = Some(stepper);
        self
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Latest stored result.
    pub fn last_result(&self) -> Option<AnalysisResult> {
        self.view().last_result.clone()
    }

    /// Whether an analyze call is in flight.
    pub fn pending(&self) -> bool {
        self.view().pending > 0
    }

    /// Receive the stored result whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AnalysisResult>> {
        self.results.subscribe()
    }

    /// Tear down the view: clear the stored result, stop the stepper and
    /// ignore responses of calls still in flight.
    pub fn detach(&self) {
        {
            let mut view = self.view();
            view.generation += 1;
            view.pending = 0;
            view.last_result = None;
        }
        if let Some(stepper) = &self.stepper {
            stepper.set_active(false);
        }
        self.results.send_replace(None);
        debug!("analysis view detached");
    }

    /// Analyze `repo_url` against an assessment.
    ///
    /// Only invalid input is returned as an error. Every remote outcome is
    /// reported through the notifier and returned as an [`AnalysisOutcome`].
    /// Concurrent runs are not deduplicated; callers disable the trigger
    /// while [`pending`](Self::pending) is true.
    pub async fn run_analysis(
        &self,
        assessment_id: &AssessmentId,
        repo_url: &str,
    ) -> Result<AnalysisOutcome> {
        validation::validate_analysis(assessment_id, repo_url)?;

        let run = PendingRun::start(self);
        info!(assessment = %assessment_id, repo = repo_url, "analysis started");

        let request = AnalyzeRequest { repo_url: repo_url.to_string() };
        let response = match tokio::time::timeout(
            self.config.analyze_timeout,
            self.ctx.backend.analyze(assessment_id, &request),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => Err(ApiError::Timeout),
        };

        // Any resolved response may have changed stored results.
        if response.is_ok() {
            self.invalidate(Mutation::Analyze { assessment_id: assessment_id.clone() });
        }

        if !run.finish() {
            debug!(assessment = %assessment_id, "analysis resolved after detach; ignored");
            return Ok(AnalysisOutcome::Discarded);
        }

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(assessment = %assessment_id, error = %err, "analysis call failed");
                self.ctx.notify(Notification::error("Analysis Failed", ANALYSIS_FAILED));
                return Ok(AnalysisOutcome::Failed(err));
            }
        };

        let result = if response.success {
            match response.data {
                Some(result) => result,
                None => AnalysisResult::failed(assessment_id.clone(), UNKNOWN_ERROR),
            }
        } else {
            AnalysisResult::failed(assessment_id.clone(), response.failure_message())
        };

        self.store(result.clone());
        if result.success {
            info!(assessment = %assessment_id, items = result.total_items(), "analysis completed");
            self.ctx.notify(Notification::success(
                "Analysis Completed",
                format!(
                    "Assessment analysis completed successfully. {} items analyzed.",
                    result.total_items()
                ),
            ));
            Ok(AnalysisOutcome::Completed(result))
        } else {
            let message = if result.message.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                result.message.clone()
            };
            warn!(assessment = %assessment_id, %message, "analysis reported failure");
            self.ctx.notify(Notification::error("Analysis Failed", message));
            Ok(AnalysisOutcome::Reported(result))
        }
    }

    /// Recompute item statuses from their scores.
    ///
    /// Thresholds must lie in 0-100 with `applied >= partial`; anything else
    /// is rejected before the call.
    pub async fn apply_status_thresholds(
        &self,
        assessment_id: &AssessmentId,
        applied_threshold: u8,
        partial_threshold: u8,
    ) -> Result<StatusOutcome> {
        if assessment_id.is_blank() {
            return Err(ValidationError::Required("Assessment id").into());
        }
        let request = UpdateStatusRequest { applied_threshold, partial_threshold };
        validation::validate_thresholds(&request)?;

        let generation = self.view().generation;
        let response = self.ctx.backend.update_status(assessment_id, &request).await;
        if response.is_ok() {
            self.invalidate(Mutation::UpdateStatuses { assessment_id: assessment_id.clone() });
        }
        if self.view().generation != generation {
            return Ok(StatusOutcome::Discarded);
        }

        match response {
            Ok(resp) => match (resp.success, resp.data.clone()) {
                (true, Some(result)) => {
                    self.ctx.notify(Notification::success(
                        "Statuses Updated",
                        format!(
                            "Successfully updated {} item statuses based on analysis scores.",
                            result.total_updated
                        ),
                    ));
                    Ok(StatusOutcome::Updated(result))
                }
                _ => {
                    let message = resp.failure_message();
                    self.ctx.notify(Notification::error("Update Failed", message.clone()));
                    Ok(StatusOutcome::Rejected(message))
                }
            },
            Err(err) => {
                warn!(assessment = %assessment_id, error = %err, "status update failed");
                self.ctx.notify(Notification::error("Update Failed", STATUS_UPDATE_FAILED));
                Ok(StatusOutcome::Failed(err))
            }
        }
    }

    /// Stored results of an assessment.
    pub async fn results(&self, assessment_id: &AssessmentId) -> Result<AssessmentResults> {
        let id = assessment_id.clone();
        self.ctx
            .read(&keys::results(&id), move |backend| async move {
                backend.assessment_results(&id).await
            })
            .await
    }

    /// Items scoring below `threshold`.
    pub async fn not_implemented(
        &self,
        assessment_id: &AssessmentId,
        threshold: Option<u8>,
    ) -> Result<NotImplementedItems> {
        let id = assessment_id.clone();
        self.ctx
            .read(&keys::not_implemented(&id, threshold), move |backend| async move {
                backend.not_implemented(&id, threshold).await
            })
            .await
    }

    fn invalidate(&self, mutation: Mutation) {
        let count = self.ctx.cache.invalidate_all(&mutation.invalidated_keys());
        debug!(?mutation, count, "analysis caches invalidated");
    }

    /// Settle one pending call. Returns false when the view moved on.
    fn resolve(&self, generation: u64) -> bool {
        let idle = {
            let mut view = self.view();
            if view.generation != generation {
                return false;
            }
            view.pending = view.pending.saturating_sub(1);
            view.pending == 0
        };
        if idle {
            if let Some(stepper) = &self.stepper {
                stepper.set_active(false);
            }
        }
        true
    }

    fn begin(&self) -> u64 {
        let generation = {
            let mut view = self.view();
            view.pending += 1;
            view.generation
        };
        if let Some(stepper) = &self.stepper {
            stepper.restart();
        }
        generation
    }

    fn store(&self, result: AnalysisResult) {
        self.view().last_result = Some(result.clone());
        self.results.send_replace(Some(result));
    }
}

/// One pending analyze call. Settles the call on drop, so a run whose
/// future is dropped mid-flight still releases `pending` and the stepper.
struct PendingRun<'a> {
    orchestrator: &'a AnalysisOrchestrator,
    generation: u64,
    settled: bool,
}

impl<'a> PendingRun<'a> {
    fn start(orchestrator: &'a AnalysisOrchestrator) -> Self {
        let generation = orchestrator.begin();
        Self { orchestrator, generation, settled: false }
    }

    /// Settle normally. Returns false when the view moved on.
    fn finish(mut self) -> bool {
        self.settled = true;
        self.orchestrator.resolve(self.generation)
    }
}

impl Drop for PendingRun<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("analysis call dropped before it resolved");
            self.orchestrator.resolve(self.generation);
        }
    }
}

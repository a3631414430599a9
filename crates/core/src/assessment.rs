//! Assessment analysis model - analyze requests, results, and status updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use crate::id::{AssessmentId, AssessmentItemId};
use crate::time::{lenient, Time};

/// Request body for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Repository to analyze
    pub repo_url: String,
}

/// Outcome of one analyze call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Whether the analysis succeeded
    pub success: bool,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Assessment that was analyzed
    pub assessment_id: AssessmentId,

    /// Repository details gathered during ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_info: Option<RepositoryInfo>,

    /// Aggregate summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_summary: Option<AnalysisSummary>,

    /// Number of items below the implementation threshold
    #[serde(default)]
    pub not_implemented_count: u32,

    /// Per-item results
    #[serde(default)]
    pub results: Vec<ItemResult>,

    /// Ids of items judged not implemented
    #[serde(default)]
    pub not_implemented_items: Vec<String>,
}

impl AnalysisResult {
    /// A reported failure with no payload beyond the message.
    pub fn failed(assessment_id: AssessmentId, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            assessment_id,
            repository_info: None,
            analysis_summary: None,
            not_implemented_count: 0,
            results: Vec::new(),
            not_implemented_items: Vec::new(),
        }
    }

    /// Total analyzed items, zero when no summary was returned.
    pub fn total_items(&self) -> u32 {
        self.analysis_summary.as_ref().map_or(0, |s| s.total_items)
    }
}

/// Repository details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    /// Short summary of the repository
    pub summary: String,

    /// Number of files ingested
    pub total_files: u32,
}

/// Aggregate summary of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Total analyzed items
    pub total_items: u32,

    /// Items judged applied
    pub applied_count: u32,

    /// Items judged partially applied
    pub partially_applied_count: u32,

    /// Items judged not applied
    pub not_applied_count: u32,

    /// Applied share, 0-100
    pub applied_percentage: f64,

    /// Partially applied share, 0-100
    #[serde(default)]
    pub partially_applied_percentage: f64,

    /// Not applied share, 0-100
    #[serde(default)]
    pub not_applied_percentage: f64,

    /// Mean item score, 0-100
    pub average_score: f64,

    /// Qualitative readiness label
    pub implementation_readiness: String,
}

impl AnalysisSummary {
    /// Build a summary from raw counts, deriving the percentages.
    pub fn from_counts(
        applied: u32,
        partial: u32,
        not_applied: u32,
        average_score: f64,
        implementation_readiness: impl Into<String>,
    ) -> Self {
        let total = applied + partial + not_applied;
        Self {
            total_items: total,
            applied_count: applied,
            partially_applied_count: partial,
            not_applied_count: not_applied,
            applied_percentage: percentage(applied, total),
            partially_applied_percentage: percentage(partial, total),
            not_applied_percentage: percentage(not_applied, total),
            average_score,
            implementation_readiness: implementation_readiness.into(),
        }
    }

    /// Counts sum to the total and percentages derive from the counts.
    pub fn is_consistent(&self) -> bool {
        let sum = self.applied_count + self.partially_applied_count + self.not_applied_count;
        if sum != self.total_items {
            return false;
        }
        let close = |pct: f64, count: u32| (pct - percentage(count, self.total_items)).abs() <= 0.5;
        close(self.applied_percentage, self.applied_count)
            && close(self.partially_applied_percentage, self.partially_applied_count)
            && close(self.not_applied_percentage, self.not_applied_count)
            && (0.0..=100.0).contains(&self.average_score)
    }
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) * 100.0 / f64::from(total)
    }
}

/// Result for one assessment item within an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    /// Item the result belongs to
    pub assessment_item_id: AssessmentItemId,

    /// Score, 0-100
    pub score: f64,

    /// Status the analysis suggests
    pub suggested_status: String,

    /// Supporting evidence
    #[serde(default)]
    pub evidence: String,

    /// Reviewer-style comments
    #[serde(default)]
    pub comments: String,

    /// Reasoning behind the score
    #[serde(default)]
    pub reasoning: String,

    /// Item category
    #[serde(default)]
    pub category: String,
}

/// Item implementation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Score at or above the applied threshold
    Applied,
    /// Score at or above the partial threshold
    PartiallyApplied,
    /// Below both thresholds
    NotApplied,
}

impl ItemStatus {
    /// Parse a server status label, ignoring case.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "applied" => Some(Self::Applied),
            "partially applied" | "partiallyapplied" | "partial" => Some(Self::PartiallyApplied),
            "not applied" | "notapplied" => Some(Self::NotApplied),
            _ => None,
        }
    }

    /// Status a score maps to under the given thresholds.
    pub fn for_score(score: f64, applied_threshold: u8, partial_threshold: u8) -> Self {
        if score >= f64::from(applied_threshold) {
            Self::Applied
        } else if score >= f64::from(partial_threshold) {
            Self::PartiallyApplied
        } else {
            Self::NotApplied
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Applied => write!(f, "Applied"),
            ItemStatus::PartiallyApplied => write!(f, "Partially Applied"),
            ItemStatus::NotApplied => write!(f, "Not Applied"),
        }
    }
}

/// Stored results of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResults {
    /// Assessment
    pub assessment_id: AssessmentId,

    /// Number of items
    pub total_items: u32,

    /// Items with their results
    #[serde(default)]
    pub items: Vec<AssessmentItemWithResults>,

    /// Aggregate statistics
    pub statistics: AssessmentStatistics,
}

/// One assessment item and the results recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentItemWithResults {
    /// Item id
    pub id: AssessmentItemId,

    /// Category
    pub category: String,

    /// Short item title
    pub evaluation_item: String,

    /// Description
    pub description: String,

    /// Responsible role
    #[serde(default)]
    pub role: String,

    /// Current status label
    pub status: String,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Recorded results
    #[serde(default)]
    pub results: Vec<ResultSummary>,
}

/// A single recorded score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    /// Result id
    pub id: String,

    /// Score, 0-100
    pub score: f64,

    /// Comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Author
    pub user_name: String,

    /// When recorded
    #[serde(with = "lenient")]
    pub created_at: Time,
}

/// Aggregate statistics over an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStatistics {
    pub total_items: u32,
    pub items_analyzed: u32,
    pub items_pending: u32,
    pub average_score: f64,
    pub applied_count: u32,
    pub partially_applied_count: u32,
    pub not_applied_count: u32,
    pub implementation_readiness: String,
}

/// Items scoring below a threshold, grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotImplementedItems {
    /// Assessment
    pub assessment_id: AssessmentId,

    /// Threshold applied by the server
    pub score_threshold: f64,

    /// Total items below threshold
    pub total_not_implemented: u32,

    /// Items keyed by category
    #[serde(default)]
    pub items_by_category: BTreeMap<String, Vec<NotImplementedItem>>,

    /// Per-category summary
    #[serde(default)]
    pub summary: Vec<CategorySummary>,
}

/// An item below the implementation threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotImplementedItem {
    pub id: AssessmentItemId,
    pub category: String,
    pub evaluation_item: String,
    pub description: String,
    #[serde(default)]
    pub role: String,
    pub current_score: f64,
    #[serde(default, with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub last_analyzed: Option<Time>,
    #[serde(default)]
    pub reasoning: String,
}

/// Per-category rollup of not-implemented items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub count: u32,
    pub average_score: f64,
}

/// Request body for a status threshold update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// Minimum score for "Applied"
    pub applied_threshold: u8,

    /// Minimum score for "Partially Applied"
    pub partial_threshold: u8,
}

/// Outcome of a status threshold update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResult {
    pub assessment_id: AssessmentId,
    pub applied_threshold: u8,
    pub partial_threshold: u8,
    pub total_updated: u32,
    #[serde(default)]
    pub updates: Vec<ItemStatusUpdate>,
}

/// One item whose status changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatusUpdate {
    pub item_id: AssessmentItemId,
    pub evaluation_item: String,
    pub old_status: String,
    pub new_status: String,
    pub score: f64,
}

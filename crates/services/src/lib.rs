//! Vendorboard services.
//!
//! The layer between the views and the backend: cached reads, mutations
//! that keep the cache consistent, and orchestration of assessment analysis
//! runs. Every remote outcome is reported through a [`Notifier`].

#![warn(missing_docs)]

mod context;
mod error;
mod notify;

pub mod dashboard;
pub mod orchestrator;
pub mod products;
pub mod vendors;

#[cfg(test)]
mod fake;

pub use context::ServiceContext;
pub use error::{Result, ServiceError};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};

pub use dashboard::{DashboardService, DashboardSummary, VendorShare};
pub use orchestrator::{
    AnalysisOrchestrator, AnalysisOutcome, OrchestratorConfig, StatusOutcome, ANALYSIS_FAILED,
    STATUS_UPDATE_FAILED,
};
pub use products::ProductService;
pub use vendors::VendorService;

//! Vendorboard core data models.
//!
//! This crate defines the data structures shared by every layer of the
//! vendor management client: backend DTOs, the response envelope, the
//! analysis phase catalog, and the session context.

#![warn(missing_docs)]

// Core identities
mod id;
mod time;

// Backend resources
mod vendor;
mod product;
mod assessment;
mod response;

// Client-side state
mod phase;
mod session;
mod notification;

pub mod validation;

// Re-exports
pub use id::*;
pub use time::{lenient, Clock, ManualClock, SystemClock, Time};

// Vendors & Products
pub use vendor::{Vendor, CreateVendor, UpdateVendor};
pub use product::{Product, CreateProduct, UpdateProduct, ApproveProduct};

// Assessment analysis
pub use assessment::{
    AnalyzeRequest, AnalysisResult, AnalysisSummary, RepositoryInfo, ItemResult, ItemStatus,
    AssessmentResults, AssessmentItemWithResults, ResultSummary, AssessmentStatistics,
    NotImplementedItems, NotImplementedItem, CategorySummary,
    UpdateStatusRequest, StatusUpdateResult, ItemStatusUpdate,
};
pub use response::{ApiResponse, UNKNOWN_ERROR};

// Stepper configuration
pub use phase::{PhaseSpec, PhaseSequence, PhaseIcon, PhaseStatus, PhaseError};

// Session & notifications
pub use session::{Session, SessionState};
pub use notification::{Notification, NotificationLevel};
pub use validation::ValidationError;

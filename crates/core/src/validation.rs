//! Input validation performed before any remote call.

use std::sync::OnceLock;

use regex::Regex;
use crate::assessment::UpdateStatusRequest;
use crate::id::AssessmentId;
use crate::product::{CreateProduct, UpdateProduct};
use crate::vendor::CreateVendor;

/// Rejected input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty
    #[error("{0} is required")]
    Required(&'static str),

    /// Email does not look like an address
    #[error("Email is invalid")]
    InvalidEmail,

    /// A percentage threshold is above 100
    #[error("{field} must be between 0 and 100 (got {value})")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Value given
        value: u8,
    },

    /// Applied threshold is below the partial threshold
    #[error("applied threshold ({applied}) must not be below partial threshold ({partial})")]
    InvertedThresholds {
        /// Applied threshold
        applied: u8,
        /// Partial threshold
        partial: u8,
    },
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"))
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Validate a vendor create/update payload.
pub fn validate_vendor(vendor: &CreateVendor) -> Result<(), ValidationError> {
    require(&vendor.name, "Vendor name")?;
    require(&vendor.email, "Email")?;
    if !email_pattern().is_match(&vendor.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate a product create payload.
pub fn validate_new_product(product: &CreateProduct) -> Result<(), ValidationError> {
    require(&product.name, "Product name")?;
    require(&product.description, "Description")?;
    if product.vendor_id.is_blank() {
        return Err(ValidationError::Required("Vendor selection"));
    }
    Ok(())
}

/// Validate a product update payload.
pub fn validate_product_update(product: &UpdateProduct) -> Result<(), ValidationError> {
    require(&product.name, "Product name")?;
    require(&product.description, "Description")
}

/// Validate sign-in credentials.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    require(username, "Username")?;
    require(password, "Password")
}

/// Validate an analysis request.
pub fn validate_analysis(assessment_id: &AssessmentId, repo_url: &str) -> Result<(), ValidationError> {
    if assessment_id.is_blank() {
        return Err(ValidationError::Required("Assessment id"));
    }
    require(repo_url, "Repository URL")
}

/// Validate status thresholds: both within 0-100 and applied >= partial.
pub fn validate_thresholds(request: &UpdateStatusRequest) -> Result<(), ValidationError> {
    for (field, value) in [
        ("appliedThreshold", request.applied_threshold),
        ("partialThreshold", request.partial_threshold),
    ] {
        if value > 100 {
            return Err(ValidationError::OutOfRange { field, value });
        }
    }
    if request.applied_threshold < request.partial_threshold {
        return Err(ValidationError::InvertedThresholds {
            applied: request.applied_threshold,
            partial: request.partial_threshold,
        });
    }
    Ok(())
}

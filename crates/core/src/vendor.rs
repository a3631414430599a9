//! Vendor model.

use serde::{Deserialize, Serialize};
use crate::id::VendorId;
use crate::time::{lenient, Time};

/// A vendor supplying one or more products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Unique identifier
    pub id: VendorId,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,

    /// When created
    #[serde(with = "lenient")]
    pub created_at: Time,

    /// Number of products registered for this vendor
    #[serde(default)]
    pub product_count: u32,
}

/// Payload for creating a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendor {
    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,
}

/// Payload for updating a vendor.
pub type UpdateVendor = CreateVendor;

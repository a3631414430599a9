//! Product model.

use serde::{Deserialize, Serialize};
use crate::id::{ProductId, VendorId};
use crate::time::{lenient, Time};

/// A product offered by a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Description
    pub description: String,

    /// Owning vendor
    pub vendor_id: VendorId,

    /// Owning vendor's display name
    #[serde(default)]
    pub vendor_name: String,

    /// When stage 1 approval was granted
    #[serde(default, with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub stage1_approved_at: Option<Time>,

    /// Approver id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1_approved_by: Option<String>,

    /// Approver display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1_approved_by_name: Option<String>,

    /// When created
    #[serde(with = "lenient")]
    pub created_at: Time,

    /// Workflow status as reported by the server
    #[serde(default)]
    pub status: String,
}

impl Product {
    /// True once stage 1 approval has been recorded.
    pub fn is_approved(&self) -> bool {
        self.stage1_approved_at.is_some()
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    /// Product name
    pub name: String,

    /// Description
    pub description: String,

    /// Owning vendor
    pub vendor_id: VendorId,
}

/// Payload for updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    /// Product name
    pub name: String,

    /// Description
    pub description: String,
}

/// Payload for approving a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveProduct {
    /// Optional reviewer comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_backend_shape() {
        let json = r#"{
            "id": "p-1",
            "name": "Gateway",
            "description": "API gateway",
            "vendorId": "v-1",
            "vendorName": "Acme",
            "stage1ApprovedAt": null,
            "createdAt": "2024-03-01T08:30:00",
            "status": "Draft"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.vendor_id, VendorId::new("v-1"));
        assert!(!product.is_approved());
        assert!(product.stage1_approved_by.is_none());
    }

    #[test]
    fn test_approve_payload_omits_missing_comments() {
        let json = serde_json::to_string(&ApproveProduct::default()).unwrap();
        assert_eq!(json, "{}");
    }
}

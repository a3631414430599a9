//! Mutation invalidation rules.
//!
//! Every remote mutation maps to the key scopes whose cached reads it makes
//! outdated. Callers apply the returned prefixes with
//! [`QueryCache::invalidate_all`](crate::QueryCache::invalidate_all).

use vendorboard_core::{AssessmentId, ProductId, VendorId};

use crate::key::{keys, QueryKey};

/// A remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Vendor created
    CreateVendor,

    /// Vendor updated
    UpdateVendor {
        /// Updated vendor
        vendor_id: VendorId,
    },

    /// Vendor deleted
    DeleteVendor {
        /// Deleted vendor
        vendor_id: VendorId,
    },

    /// Product created for a vendor
    CreateProduct {
        /// Owning vendor
        vendor_id: VendorId,
    },

    /// Product updated
    UpdateProduct {
        /// Updated product
        product_id: ProductId,
    },

    /// Product deleted
    DeleteProduct {
        /// Deleted product
        product_id: ProductId,
    },

    /// Product approved at stage 1
    ApproveProduct {
        /// Approved product
        product_id: ProductId,
    },

    /// Repository analysis run for an assessment
    Analyze {
        /// Analyzed assessment
        assessment_id: AssessmentId,
    },

    /// Item statuses recomputed from scores
    UpdateStatuses {
        /// Updated assessment
        assessment_id: AssessmentId,
    },
}

impl Mutation {
    /// Key scopes to mark stale once this mutation has been applied.
    pub fn invalidated_keys(&self) -> Vec<QueryKey> {
        match self {
            Mutation::CreateVendor => vec![keys::vendor_list()],
            Mutation::UpdateVendor { vendor_id } | Mutation::DeleteVendor { vendor_id } => {
                vec![keys::vendor_list(), keys::vendor_detail(vendor_id)]
            }
            Mutation::CreateProduct { vendor_id } => vec![
                keys::product_list(),
                keys::products_by_vendor(vendor_id),
                keys::vendors(),
            ],
            // The owning vendor is not known to these calls, so every
            // product listing goes.
            Mutation::UpdateProduct { .. }
            | Mutation::DeleteProduct { .. }
            | Mutation::ApproveProduct { .. } => vec![keys::products(), keys::vendors()],
            Mutation::Analyze { assessment_id } | Mutation::UpdateStatuses { assessment_id } => {
                vec![
                    keys::results(assessment_id),
                    keys::not_implemented_all(assessment_id),
                ]
            }
        }
    }
}

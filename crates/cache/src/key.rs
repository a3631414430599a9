//! Structured cache keys.

use serde::Serialize;
use vendorboard_core::{AssessmentId, ProductId, VendorId};

/// Ordered list of segments identifying a cached read.
///
/// Keys form a hierarchy: a key is an ancestor of every key it is a prefix
/// of, so invalidating `products` reaches `products:vendor:v-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Extend with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` is this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}

/// Key factories for every cached resource.
pub mod keys {
    use super::*;

    /// Every vendor read.
    pub fn vendors() -> QueryKey {
        QueryKey::new(["vendors"])
    }

    /// The vendor list.
    pub fn vendor_list() -> QueryKey {
        vendors().child("list")
    }

    /// One vendor.
    pub fn vendor_detail(id: &VendorId) -> QueryKey {
        vendors().child("detail").child(id.as_str())
    }

    /// Every product read.
    pub fn products() -> QueryKey {
        QueryKey::new(["products"])
    }

    /// The global product list.
    pub fn product_list() -> QueryKey {
        products().child("list")
    }

    /// One product.
    pub fn product_detail(id: &ProductId) -> QueryKey {
        products().child("detail").child(id.as_str())
    }

    /// Products of one vendor.
    pub fn products_by_vendor(vendor_id: &VendorId) -> QueryKey {
        products().child("vendor").child(vendor_id.as_str())
    }

    /// Every assessment analysis read.
    pub fn analysis() -> QueryKey {
        QueryKey::new(["assessment-analysis"])
    }

    /// Stored results of an assessment.
    pub fn results(assessment_id: &AssessmentId) -> QueryKey {
        analysis().child("results").child(assessment_id.as_str())
    }

    /// Not-implemented reads of an assessment, any threshold.
    pub fn not_implemented_all(assessment_id: &AssessmentId) -> QueryKey {
        analysis().child("not-implemented").child(assessment_id.as_str())
    }

    /// Not-implemented items of an assessment at one threshold.
    pub fn not_implemented(assessment_id: &AssessmentId, threshold: Option<u8>) -> QueryKey {
        let threshold = threshold.map_or_else(|| "any".to_string(), |t| t.to_string());
        not_implemented_all(assessment_id).child(threshold)
    }
}

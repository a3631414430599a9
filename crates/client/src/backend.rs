//! The remote data collaborator seen by the rest of the application.

use async_trait::async_trait;
use serde_json::Value;
use vendorboard_core::{
    AnalysisResult, AnalyzeRequest, ApiResponse, ApproveProduct, AssessmentId, AssessmentResults,
    CreateProduct, CreateVendor, NotImplementedItems, Product, ProductId, StatusUpdateResult,
    UpdateProduct, UpdateStatusRequest, UpdateVendor, Vendor, VendorId,
};

use crate::error::Result;

/// Envelope of a call whose payload is not used.
pub type Ack = ApiResponse<Value>;

/// Backend API.
///
/// `Err` means the call itself failed (transport, status, auth). A call that
/// completed but was refused by the server returns `Ok` with
/// `success == false`.
#[async_trait]
pub trait Backend: Send + Sync {
    // === Vendors ===

    /// List all vendors.
    async fn list_vendors(&self) -> Result<ApiResponse<Vec<Vendor>>>;

    /// Get one vendor.
    async fn get_vendor(&self, id: &VendorId) -> Result<ApiResponse<Vendor>>;

    /// Create a vendor.
    async fn create_vendor(&self, vendor: &CreateVendor) -> Result<ApiResponse<Vendor>>;

    /// Update a vendor.
    async fn update_vendor(&self, id: &VendorId, vendor: &UpdateVendor) -> Result<Ack>;

    /// Delete a vendor.
    async fn delete_vendor(&self, id: &VendorId) -> Result<Ack>;

    // === Products ===

    /// List all products.
    async fn list_products(&self) -> Result<ApiResponse<Vec<Product>>>;

    /// List the products of one vendor.
    async fn list_vendor_products(&self, vendor_id: &VendorId) -> Result<ApiResponse<Vec<Product>>>;

    /// Get one product.
    async fn get_product(&self, id: &ProductId) -> Result<ApiResponse<Product>>;

    /// Create a product.
    async fn create_product(&self, product: &CreateProduct) -> Result<ApiResponse<Product>>;

    /// Update a product.
    async fn update_product(&self, id: &ProductId, product: &UpdateProduct) -> Result<Ack>;

    /// Delete a product.
    async fn delete_product(&self, id: &ProductId) -> Result<Ack>;

    /// Record stage 1 approval.
    async fn approve_product(&self, id: &ProductId, approval: &ApproveProduct) -> Result<Ack>;

    // === Assessment analysis ===

    /// Analyze a repository against an assessment.
    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalysisResult>>;

    /// Stored results of an assessment.
    async fn assessment_results(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<ApiResponse<AssessmentResults>>;

    /// Items scoring below `threshold` (server default when `None`).
    async fn not_implemented(
        &self,
        assessment_id: &AssessmentId,
        threshold: Option<u8>,
    ) -> Result<ApiResponse<NotImplementedItems>>;

    /// Recompute item statuses from scores.
    async fn update_status(
        &self,
        assessment_id: &AssessmentId,
        request: &UpdateStatusRequest,
    ) -> Result<ApiResponse<StatusUpdateResult>>;
}

/// API paths.
pub mod endpoints {
    use vendorboard_core::{AssessmentId, ProductId, VendorId};

    /// Vendor collection.
    pub const VENDORS: &str = "/api/v1/vendors";

    /// Product collection.
    pub const PRODUCTS: &str = "/api/v1/products";

    /// One vendor.
    pub fn vendor(id: &VendorId) -> String {
        format!("{VENDORS}/{id}")
    }

    /// Products nested under a vendor.
    pub fn vendor_products(id: &VendorId) -> String {
        format!("{VENDORS}/{id}/products")
    }

    /// One product.
    pub fn product(id: &ProductId) -> String {
        format!("{PRODUCTS}/{id}")
    }

    /// Stage 1 approval of a product.
    pub fn approve(id: &ProductId) -> String {
        format!("{PRODUCTS}/{id}/approve")
    }

    fn analysis(id: &AssessmentId, action: &str) -> String {
        format!("/api/v1/assessmentanalysis/{id}/{action}")
    }

    /// Run analysis.
    pub fn analyze(id: &AssessmentId) -> String {
        analysis(id, "analyze")
    }

    /// Stored results.
    pub fn results(id: &AssessmentId) -> String {
        analysis(id, "results")
    }

    /// Not-implemented items.
    pub fn not_implemented(id: &AssessmentId) -> String {
        analysis(id, "not-implemented")
    }

    /// Status recomputation.
    pub fn update_status(id: &AssessmentId) -> String {
        analysis(id, "update-status")
    }
}

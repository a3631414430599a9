//! In-memory backend for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use vendorboard_client::{Ack, ApiError, Backend, Result};
use vendorboard_core::{
    AnalysisResult, AnalysisSummary, AnalyzeRequest, ApiResponse, ApproveProduct, AssessmentId,
    AssessmentResults, AssessmentStatistics, CreateProduct, CreateVendor, NotImplementedItems,
    Product, ProductId, StatusUpdateResult, UpdateProduct, UpdateStatusRequest, UpdateVendor,
    Vendor, VendorId,
};

#[derive(Default)]
struct State {
    vendors: Vec<Vendor>,
    products: Vec<Product>,
    calls: HashMap<&'static str, usize>,
    next_id: usize,
}

/// Scriptable backend.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    pub analyze_response: Mutex<Option<Result<ApiResponse<AnalysisResult>>>>,
    pub update_status_response: Mutex<Option<Result<ApiResponse<StatusUpdateResult>>>>,
    pub delay: Mutex<Duration>,
    pub fail_writes: Mutex<Option<ApiError>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vendor(self, id: &str, name: &str) -> Self {
        self.lock().vendors.push(Vendor {
            id: VendorId::new(id),
            name: name.to_string(),
            email: format!("ops@{id}.io"),
            created_at: Utc::now(),
            product_count: 0,
        });
        self
    }

    pub fn with_product(self, id: &str, name: &str, vendor_id: &str) -> Self {
        {
            let mut state = self.lock();
            state.products.push(product(id, name, vendor_id));
            if let Some(v) = state.vendors.iter_mut().find(|v| v.id.as_str() == vendor_id) {
                v.product_count += 1;
            }
        }
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.lock().calls.get(endpoint).copied().unwrap_or(0)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn respond_to_analyze(&self, response: Result<ApiResponse<AnalysisResult>>) {
        *self.analyze_response.lock().unwrap() = Some(response);
    }

    pub fn respond_to_update_status(&self, response: Result<ApiResponse<StatusUpdateResult>>) {
        *self.update_status_response.lock().unwrap() = Some(response);
    }

    pub fn fail_writes_with(&self, err: ApiError) {
        *self.fail_writes.lock().unwrap() = Some(err);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    async fn enter(&self, endpoint: &'static str) {
        *self.lock().calls.entry(endpoint).or_default() += 1;
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn write_failure(&self) -> Option<ApiError> {
        self.fail_writes.lock().unwrap().clone()
    }
}

pub fn product(id: &str, name: &str, vendor_id: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} description"),
        vendor_id: VendorId::new(vendor_id),
        vendor_name: String::new(),
        stage1_approved_at: None,
        stage1_approved_by: None,
        stage1_approved_by_name: None,
        created_at: Utc::now(),
        status: "Draft".to_string(),
    }
}

pub fn analysis(assessment: &str, applied: u32, partial: u32, not_applied: u32) -> AnalysisResult {
    AnalysisResult {
        success: true,
        message: "Analysis complete".to_string(),
        assessment_id: AssessmentId::new(assessment),
        repository_info: None,
        analysis_summary: Some(AnalysisSummary::from_counts(
            applied,
            partial,
            not_applied,
            64.0,
            "Partial",
        )),
        not_implemented_count: not_applied,
        results: Vec::new(),
        not_implemented_items: Vec::new(),
    }
}

fn not_found<T>(what: &str) -> ApiResponse<T> {
    ApiResponse::failure(format!("{what} not found"), Vec::new())
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_vendors(&self) -> Result<ApiResponse<Vec<Vendor>>> {
        self.enter("list_vendors").await;
        Ok(ApiResponse::ok(self.lock().vendors.clone(), ""))
    }

    async fn get_vendor(&self, id: &VendorId) -> Result<ApiResponse<Vendor>> {
        self.enter("get_vendor").await;
        let found = self.lock().vendors.iter().find(|v| &v.id == id).cloned();
        Ok(found.map_or_else(|| not_found("Vendor"), |v| ApiResponse::ok(v, "")))
    }

    async fn create_vendor(&self, vendor: &CreateVendor) -> Result<ApiResponse<Vendor>> {
        self.enter("create_vendor").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        state.next_id += 1;
        let created = Vendor {
            id: VendorId::new(format!("v-new-{}", state.next_id)),
            name: vendor.name.clone(),
            email: vendor.email.clone(),
            created_at: Utc::now(),
            product_count: 0,
        };
        state.vendors.push(created.clone());
        Ok(ApiResponse::ok(created, "Vendor created"))
    }

    async fn update_vendor(&self, id: &VendorId, vendor: &UpdateVendor) -> Result<Ack> {
        self.enter("update_vendor").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        match state.vendors.iter_mut().find(|v| &v.id == id) {
            Some(v) => {
                v.name = vendor.name.clone();
                v.email = vendor.email.clone();
                Ok(ApiResponse::ok(serde_json::Value::Null, "Vendor updated"))
            }
            None => Ok(not_found("Vendor")),
        }
    }

    async fn delete_vendor(&self, id: &VendorId) -> Result<Ack> {
        self.enter("delete_vendor").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        let before = state.vendors.len();
        state.vendors.retain(|v| &v.id != id);
        if state.vendors.len() == before {
            return Ok(not_found("Vendor"));
        }
        Ok(ApiResponse::ok(serde_json::Value::Null, "Vendor deleted"))
    }

    async fn list_products(&self) -> Result<ApiResponse<Vec<Product>>> {
        self.enter("list_products").await;
        Ok(ApiResponse::ok(self.lock().products.clone(), ""))
    }

    async fn list_vendor_products(&self, vendor_id: &VendorId) -> Result<ApiResponse<Vec<Product>>> {
        self.enter("list_vendor_products").await;
        let products = self
            .lock()
            .products
            .iter()
            .filter(|p| &p.vendor_id == vendor_id)
            .cloned()
            .collect();
        Ok(ApiResponse::ok(products, ""))
    }

    async fn get_product(&self, id: &ProductId) -> Result<ApiResponse<Product>> {
        self.enter("get_product").await;
        let found = self.lock().products.iter().find(|p| &p.id == id).cloned();
        Ok(found.map_or_else(|| not_found("Product"), |p| ApiResponse::ok(p, "")))
    }

    async fn create_product(&self, product: &CreateProduct) -> Result<ApiResponse<Product>> {
        self.enter("create_product").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        let Some(vendor) = state.vendors.iter_mut().find(|v| v.id == product.vendor_id) else {
            return Ok(not_found("Vendor"));
        };
        vendor.product_count += 1;
        state.next_id += 1;
        let created = Product {
            description: product.description.clone(),
            ..self::product(
                &format!("p-new-{}", state.next_id),
                &product.name,
                product.vendor_id.as_str(),
            )
        };
        state.products.push(created.clone());
        Ok(ApiResponse::ok(created, "Product created"))
    }

    async fn update_product(&self, id: &ProductId, product: &UpdateProduct) -> Result<Ack> {
        self.enter("update_product").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        match state.products.iter_mut().find(|p| &p.id == id) {
            Some(p) => {
                p.name = product.name.clone();
                p.description = product.description.clone();
                Ok(ApiResponse::ok(serde_json::Value::Null, "Product updated"))
            }
            None => Ok(not_found("Product")),
        }
    }

    async fn delete_product(&self, id: &ProductId) -> Result<Ack> {
        self.enter("delete_product").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        let Some(index) = state.products.iter().position(|p| &p.id == id) else {
            return Ok(not_found("Product"));
        };
        let removed = state.products.remove(index);
        if let Some(v) = state.vendors.iter_mut().find(|v| v.id == removed.vendor_id) {
            v.product_count = v.product_count.saturating_sub(1);
        }
        Ok(ApiResponse::ok(serde_json::Value::Null, "Product deleted"))
    }

    async fn approve_product(&self, id: &ProductId, _approval: &ApproveProduct) -> Result<Ack> {
        self.enter("approve_product").await;
        if let Some(err) = self.write_failure() {
            return Err(err);
        }
        let mut state = self.lock();
        match state.products.iter_mut().find(|p| &p.id == id) {
            Some(p) => {
                p.stage1_approved_at = Some(Utc::now());
                p.status = "Approved".to_string();
                Ok(ApiResponse::ok(serde_json::Value::Null, "Product approved"))
            }
            None => Ok(not_found("Product")),
        }
    }

    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        _request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalysisResult>> {
        self.enter("analyze").await;
        self.analyze_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(ApiResponse::ok(analysis(assessment_id.as_str(), 2, 1, 1), "ok")))
    }

    async fn assessment_results(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<ApiResponse<AssessmentResults>> {
        self.enter("assessment_results").await;
        let stats = AssessmentStatistics {
            total_items: 0,
            items_analyzed: 0,
            items_pending: 0,
            average_score: 0.0,
            applied_count: 0,
            partially_applied_count: 0,
            not_applied_count: 0,
            implementation_readiness: "Unknown".to_string(),
        };
        Ok(ApiResponse::ok(
            AssessmentResults {
                assessment_id: assessment_id.clone(),
                total_items: 0,
                items: Vec::new(),
                statistics: stats,
            },
            "",
        ))
    }

    async fn not_implemented(
        &self,
        assessment_id: &AssessmentId,
        threshold: Option<u8>,
    ) -> Result<ApiResponse<NotImplementedItems>> {
        self.enter("not_implemented").await;
        Ok(ApiResponse::ok(
            NotImplementedItems {
                assessment_id: assessment_id.clone(),
                score_threshold: f64::from(threshold.unwrap_or(50)),
                total_not_implemented: 0,
                items_by_category: Default::default(),
                summary: Vec::new(),
            },
            "",
        ))
    }

    async fn update_status(
        &self,
        assessment_id: &AssessmentId,
        request: &UpdateStatusRequest,
    ) -> Result<ApiResponse<StatusUpdateResult>> {
        self.enter("update_status").await;
        self.update_status_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| {
                Ok(ApiResponse::ok(
                    StatusUpdateResult {
                        assessment_id: assessment_id.clone(),
                        applied_threshold: request.applied_threshold,
                        partial_threshold: request.partial_threshold,
                        total_updated: 3,
                        updates: Vec::new(),
                    },
                    "ok",
                ))
            })
    }
}

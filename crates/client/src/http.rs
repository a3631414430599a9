//! reqwest implementation of [`Backend`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use vendorboard_core::{
    AnalysisResult, AnalyzeRequest, ApiResponse, ApproveProduct, AssessmentId, AssessmentResults,
    CreateProduct, CreateVendor, NotImplementedItems, Product, ProductId, Session,
    StatusUpdateResult, UpdateProduct, UpdateStatusRequest, UpdateVendor, Vendor, VendorId,
};

use crate::backend::{endpoints, Ack, Backend};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// HTTP backend client.
///
/// Sends the session token as a bearer header on every request and clears
/// the session when the server answers 401.
#[derive(Clone)]
pub struct HttpBackend {
    /// HTTP client
    client: Client,

    /// Connection settings
    config: ClientConfig,

    /// Shared session
    session: Arc<Session>,
}

impl HttpBackend {
    /// Create a client for `config`.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::from_reqwest)?;
        Ok(Self { client, config, session })
    }

    /// Connection settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.config.url(path))
            .timeout(self.config.timeout);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        debug!(%method, path, "backend request");
        let response = builder.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "backend request failed");
            ApiError::from_reqwest(e)
        })?;

        let status = response.status();
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("text/html"));
        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        debug!(%method, path, status = status.as_u16(), "backend response");

        if status == StatusCode::UNAUTHORIZED {
            if self.session.logout().is_some() {
                warn!("session rejected by server; signed out");
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            return Err(status_error(status, is_html, &body));
        }

        decode_body(&body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        let builder = self.request(Method::GET, path);
        self.execute(Method::GET, path, builder).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path).json(body);
        self.execute(method, path, builder).await
    }

    async fn delete(&self, path: &str) -> Result<Ack> {
        let builder = self.request(Method::DELETE, path);
        self.execute(Method::DELETE, path, builder).await
    }
}

/// Map a non-2xx response to an error.
fn status_error(status: StatusCode, is_html: bool, body: &str) -> ApiError {
    if is_html && body.to_lowercase().contains("support id") {
        let support_id: String = body.chars().filter(char::is_ascii_digit).collect();
        warn!(%support_id, "request rejected upstream");
        return ApiError::Rejected { support_id };
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Decode a 2xx body.
///
/// Accepts the `{success, message, data, errors}` envelope or a bare payload,
/// which is wrapped as a successful envelope. An empty body is a success
/// without data.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<ApiResponse<T>> {
    if body.trim().is_empty() {
        return Ok(ApiResponse {
            success: true,
            message: String::new(),
            data: None,
            errors: Vec::new(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if value.get("success").is_some_and(Value::is_boolean) {
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    } else {
        serde_json::from_value(value)
            .map(|data| ApiResponse::ok(data, ""))
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_vendors(&self) -> Result<ApiResponse<Vec<Vendor>>> {
        self.get(endpoints::VENDORS).await
    }

    async fn get_vendor(&self, id: &VendorId) -> Result<ApiResponse<Vendor>> {
        self.get(&endpoints::vendor(id)).await
    }

    async fn create_vendor(&self, vendor: &CreateVendor) -> Result<ApiResponse<Vendor>> {
        self.send_json(Method::POST, endpoints::VENDORS, vendor).await
    }

    async fn update_vendor(&self, id: &VendorId, vendor: &UpdateVendor) -> Result<Ack> {
        self.send_json(Method::PUT, &endpoints::vendor(id), vendor).await
    }

    async fn delete_vendor(&self, id: &VendorId) -> Result<Ack> {
        self.delete(&endpoints::vendor(id)).await
    }

    async fn list_products(&self) -> Result<ApiResponse<Vec<Product>>> {
        self.get(endpoints::PRODUCTS).await
    }

    async fn list_vendor_products(&self, vendor_id: &VendorId) -> Result<ApiResponse<Vec<Product>>> {
        self.get(&endpoints::vendor_products(vendor_id)).await
    }

    async fn get_product(&self, id: &ProductId) -> Result<ApiResponse<Product>> {
        self.get(&endpoints::product(id)).await
    }

    async fn create_product(&self, product: &CreateProduct) -> Result<ApiResponse<Product>> {
        self.send_json(Method::POST, endpoints::PRODUCTS, product).await
    }

    async fn update_product(&self, id: &ProductId, product: &UpdateProduct) -> Result<Ack> {
        self.send_json(Method::PUT, &endpoints::product(id), product).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<Ack> {
        self.delete(&endpoints::product(id)).await
    }

    async fn approve_product(&self, id: &ProductId, approval: &ApproveProduct) -> Result<Ack> {
        self.send_json(Method::POST, &endpoints::approve(id), approval).await
    }

    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalysisResult>> {
        let path = endpoints::analyze(assessment_id);
        let builder = self
            .request(Method::POST, &path)
            .timeout(self.config.analyze_timeout)
            .json(request);
        self.execute(Method::POST, &path, builder).await
    }

    async fn assessment_results(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<ApiResponse<AssessmentResults>> {
        self.get(&endpoints::results(assessment_id)).await
    }

    async fn not_implemented(
        &self,
        assessment_id: &AssessmentId,
        threshold: Option<u8>,
    ) -> Result<ApiResponse<NotImplementedItems>> {
        let path = endpoints::not_implemented(assessment_id);
        let mut builder = self.request(Method::GET, &path);
        // Zero means "server default", same as no threshold.
        if let Some(threshold) = threshold.filter(|t| *t > 0) {
            builder = builder.query(&[("scoreThreshold", threshold)]);
        }
        self.execute(Method::GET, &path, builder).await
    }

    async fn update_status(
        &self,
        assessment_id: &AssessmentId,
        request: &UpdateStatusRequest,
    ) -> Result<ApiResponse<StatusUpdateResult>> {
        self.send_json(Method::POST, &endpoints::update_status(assessment_id), request).await
    }
}

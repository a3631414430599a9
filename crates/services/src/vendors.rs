//! Vendor reads and mutations.

use tracing::debug;
use vendorboard_cache::{keys, Mutation};
use vendorboard_core::{validation, CreateVendor, UpdateVendor, Vendor, VendorId};

use crate::context::{Feedback, ServiceContext};
use crate::error::Result;

/// Vendor operations.
#[derive(Clone)]
pub struct VendorService {
    ctx: ServiceContext,
}

impl VendorService {
    /// Create the service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// All vendors.
    pub async fn list(&self) -> Result<Vec<Vendor>> {
        self.ctx
            .read(&keys::vendor_list(), |backend| async move { backend.list_vendors().await })
            .await
    }

    /// One vendor.
    pub async fn get(&self, id: &VendorId) -> Result<Vendor> {
        let id = id.clone();
        self.ctx
            .read(&keys::vendor_detail(&id), move |backend| async move {
                backend.get_vendor(&id).await
            })
            .await
    }

    /// Create a vendor. Returns the created vendor when the server echoes it.
    pub async fn create(&self, vendor: &CreateVendor) -> Result<Option<Vendor>> {
        validation::validate_vendor(vendor)?;
        debug!(name = %vendor.name, "creating vendor");
        let response = self.ctx.backend.create_vendor(vendor).await;
        self.ctx.settle(
            response,
            Mutation::CreateVendor,
            Feedback {
                success_title: "Vendor Created",
                success_message: "Vendor created successfully.",
                failure_title: "Create Failed",
            },
        )
    }

    /// Update a vendor.
    pub async fn update(&self, id: &VendorId, vendor: &UpdateVendor) -> Result<()> {
        validation::validate_vendor(vendor)?;
        let response = self.ctx.backend.update_vendor(id, vendor).await;
        self.ctx
            .settle(
                response,
                Mutation::UpdateVendor { vendor_id: id.clone() },
                Feedback {
                    success_title: "Vendor Updated",
                    success_message: "Vendor updated successfully.",
                    failure_title: "Update Failed",
                },
            )
            .map(drop)
    }

    /// Delete a vendor.
    pub async fn delete(&self, id: &VendorId) -> Result<()> {
        let response = self.ctx.backend.delete_vendor(id).await;
        self.ctx
            .settle(
                response,
                Mutation::DeleteVendor { vendor_id: id.clone() },
                Feedback {
                    success_title: "Vendor Deleted",
                    success_message: "Vendor deleted successfully.",
                    failure_title: "Delete Failed",
                },
            )
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::fake::FakeBackend;
    use crate::notify::RecordingNotifier;
    use std::sync::Arc;
    use vendorboard_client::ApiError;
    use vendorboard_core::{NotificationLevel, ValidationError};

    fn service(backend: FakeBackend) -> (VendorService, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(backend);
        let notifier = Arc::new(RecordingNotifier::new());
        let ctx = ServiceContext::new(backend.clone(), notifier.clone());
        (VendorService::new(ctx), backend, notifier)
    }

    fn acme() -> CreateVendor {
        CreateVendor { name: "Acme".into(), email: "ops@acme.io".into() }
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let (vendors, backend, _) = service(FakeBackend::new().with_vendor("v-1", "Acme"));

        assert_eq!(vendors.list().await.unwrap().len(), 1);
        assert_eq!(vendors.list().await.unwrap().len(), 1);
        assert_eq!(backend.calls("list_vendors"), 1);
    }

    #[tokio::test]
    async fn test_create_invalidates_list() {
        let (vendors, backend, notifier) = service(FakeBackend::new());
        assert!(vendors.list().await.unwrap().is_empty());

        let created = vendors.create(&acme()).await.unwrap().unwrap();
        assert_eq!(created.name, "Acme");
        assert_eq!(notifier.last().unwrap().level, NotificationLevel::Success);

        assert_eq!(vendors.list().await.unwrap().len(), 1);
        assert_eq!(backend.calls("list_vendors"), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let (vendors, backend, notifier) = service(FakeBackend::new());
        let bad = CreateVendor { email: "nope".into(), ..acme() };

        let err = vendors.create(&bad).await.unwrap_err();
        assert_eq!(err, ServiceError::Validation(ValidationError::InvalidEmail));
        assert_eq!(backend.calls("create_vendor"), 0);
        assert!(notifier.all().is_empty());
    }

    #[tokio::test]
    async fn test_refused_update_keeps_cache() {
        let (vendors, backend, notifier) = service(FakeBackend::new().with_vendor("v-1", "Acme"));
        vendors.list().await.unwrap();

        let err = vendors.update(&VendorId::new("v-missing"), &acme()).await.unwrap_err();
        assert_eq!(err, ServiceError::Rejected("Vendor not found".into()));
        assert_eq!(notifier.last().unwrap().message, "Vendor not found");

        vendors.list().await.unwrap();
        assert_eq!(backend.calls("list_vendors"), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_notified() {
        let (vendors, backend, notifier) = service(FakeBackend::new().with_vendor("v-1", "Acme"));
        backend.fail_writes_with(ApiError::Http { status: 500, message: "Database unavailable".into() });

        let err = vendors.delete(&VendorId::new("v-1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api(ApiError::Http { status: 500, .. })));
        let note = notifier.last().unwrap();
        assert!(note.is_error());
        assert_eq!(note.message, "Database unavailable");
    }

    #[tokio::test]
    async fn test_delete_invalidates_detail() {
        let (vendors, backend, _) = service(FakeBackend::new().with_vendor("v-1", "Acme"));
        let id = VendorId::new("v-1");
        vendors.get(&id).await.unwrap();

        vendors.delete(&id).await.unwrap();
        let err = vendors.get(&id).await.unwrap_err();
        assert_eq!(err, ServiceError::Rejected("Vendor not found".into()));
        assert_eq!(backend.calls("get_vendor"), 2);
    }
}

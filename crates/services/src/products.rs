//! Product reads and mutations.

use tracing::debug;
use vendorboard_cache::{keys, Mutation};
use vendorboard_core::{
    validation, ApproveProduct, CreateProduct, Product, ProductId, UpdateProduct, VendorId,
};

use crate::context::{Feedback, ServiceContext};
use crate::error::Result;

/// Product operations.
#[derive(Clone)]
pub struct ProductService {
    ctx: ServiceContext,
}

impl ProductService {
    /// Create the service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// All products.
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.ctx
            .read(&keys::product_list(), |backend| async move { backend.list_products().await })
            .await
    }

    /// Products of one vendor.
    pub async fn by_vendor(&self, vendor_id: &VendorId) -> Result<Vec<Product>> {
        let vendor_id = vendor_id.clone();
        self.ctx
            .read(&keys::products_by_vendor(&vendor_id), move |backend| async move {
                backend.list_vendor_products(&vendor_id).await
            })
            .await
    }

    /// One product.
    pub async fn get(&self, id: &ProductId) -> Result<Product> {
        let id = id.clone();
        self.ctx
            .read(&keys::product_detail(&id), move |backend| async move {
                backend.get_product(&id).await
            })
            .await
    }

    /// Create a product under its vendor.
    pub async fn create(&self, product: &CreateProduct) -> Result<Option<Product>> {
        validation::validate_new_product(product)?;
        debug!(name = %product.name, vendor = %product.vendor_id, "creating product");
        let response = self.ctx.backend.create_product(product).await;
        self.ctx.settle(
            response,
            Mutation::CreateProduct { vendor_id: product.vendor_id.clone() },
            Feedback {
                success_title: "Product Created",
                success_message: "Product created successfully.",
                failure_title: "Create Failed",
            },
        )
    }

    /// Update a product.
    pub async fn update(&self, id: &ProductId, product: &UpdateProduct) -> Result<()> {
        validation::validate_product_update(product)?;
        let response = self.ctx.backend.update_product(id, product).await;
        self.ctx
            .settle(
                response,
                Mutation::UpdateProduct { product_id: id.clone() },
                Feedback {
                    success_title: "Product Updated",
                    success_message: "Product updated successfully.",
                    failure_title: "Update Failed",
                },
            )
            .map(drop)
    }

    /// Delete a product.
    pub async fn delete(&self, id: &ProductId) -> Result<()> {
        let response = self.ctx.backend.delete_product(id).await;
        self.ctx
            .settle(
                response,
                Mutation::DeleteProduct { product_id: id.clone() },
                Feedback {
                    success_title: "Product Deleted",
                    success_message: "Product deleted successfully.",
                    failure_title: "Delete Failed",
                },
            )
            .map(drop)
    }

    /// Record stage 1 approval.
    pub async fn approve(&self, id: &ProductId, comments: Option<String>) -> Result<()> {
        let approval = ApproveProduct { comments };
        let response = self.ctx.backend.approve_product(id, &approval).await;
        self.ctx
            .settle(
                response,
                Mutation::ApproveProduct { product_id: id.clone() },
                Feedback {
                    success_title: "Product Approved",
                    success_message: "Stage 1 approval recorded.",
                    failure_title: "Approval Failed",
                },
            )
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use crate::notify::RecordingNotifier;
    use crate::vendors::VendorService;
    use crate::ServiceContext;
    use std::sync::Arc;
    use vendorboard_core::AssessmentId;

    struct Fixture {
        products: ProductService,
        vendors: VendorService,
        backend: Arc<FakeBackend>,
        ctx: ServiceContext,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(
            FakeBackend::new()
                .with_vendor("v-1", "Acme")
                .with_vendor("v-2", "Globex")
                .with_product("p-1", "Gateway", "v-1"),
        );
        let ctx = ServiceContext::new(backend.clone(), Arc::new(RecordingNotifier::new()));
        Fixture {
            products: ProductService::new(ctx.clone()),
            vendors: VendorService::new(ctx.clone()),
            backend,
            ctx,
        }
    }

    fn new_product(vendor: &str) -> CreateProduct {
        CreateProduct {
            name: "Ledger".into(),
            description: "Bookkeeping".into(),
            vendor_id: VendorId::new(vendor),
        }
    }

    #[tokio::test]
    async fn test_create_refreshes_vendor_counts() {
        let f = fixture();
        let v1 = VendorId::new("v-1");
        assert_eq!(f.vendors.list().await.unwrap()[0].product_count, 1);
        assert_eq!(f.products.by_vendor(&v1).await.unwrap().len(), 1);
        f.products.list().await.unwrap();

        f.products.create(&new_product("v-1")).await.unwrap();

        assert_eq!(f.vendors.list().await.unwrap()[0].product_count, 2);
        assert_eq!(f.products.by_vendor(&v1).await.unwrap().len(), 2);
        assert_eq!(f.products.list().await.unwrap().len(), 2);
        assert_eq!(f.backend.calls("list_vendors"), 2);
        assert_eq!(f.backend.calls("list_vendor_products"), 2);
        assert_eq!(f.backend.calls("list_products"), 2);
    }

    #[tokio::test]
    async fn test_create_leaves_other_vendor_and_analysis_cached() {
        let f = fixture();
        let v2 = VendorId::new("v-2");
        let results = vendorboard_cache::keys::results(&AssessmentId::new("a-1"));
        f.products.by_vendor(&v2).await.unwrap();
        f.ctx.cache.set(&results, &"cached").unwrap();

        f.products.create(&new_product("v-1")).await.unwrap();

        f.products.by_vendor(&v2).await.unwrap();
        assert_eq!(f.backend.calls("list_vendor_products"), 1);
        assert!(f.ctx.cache.is_fresh(&results));
    }

    #[tokio::test]
    async fn test_approve_invalidates_every_listing() {
        let f = fixture();
        let id = ProductId::new("p-1");
        assert!(!f.products.get(&id).await.unwrap().is_approved());
        f.products.by_vendor(&VendorId::new("v-1")).await.unwrap();

        f.products.approve(&id, Some("Looks good".into())).await.unwrap();

        assert!(f.products.get(&id).await.unwrap().is_approved());
        f.products.by_vendor(&VendorId::new("v-1")).await.unwrap();
        assert_eq!(f.backend.calls("get_product"), 2);
        assert_eq!(f.backend.calls("list_vendor_products"), 2);
    }

    #[tokio::test]
    async fn test_delete_then_update_missing_is_refused() {
        let f = fixture();
        let id = ProductId::new("p-1");
        f.products.delete(&id).await.unwrap();

        let update = UpdateProduct { name: "Gateway 2".into(), description: "v2".into() };
        let err = f.products.update(&id, &update).await.unwrap_err();
        assert_eq!(err.user_message(), "Product not found");
    }

    #[tokio::test]
    async fn test_concurrent_reads_hit_backend_once() {
        let f = fixture();
        f.backend.set_delay(std::time::Duration::from_millis(20));

        let reads = (0..5).map(|_| f.products.list());
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.as_ref().map(Vec::len) == Ok(1)));
        assert_eq!(f.backend.calls("list_products"), 1);
    }
}

//! Dashboard summary figures.

use std::collections::HashMap;

use serde::Serialize;
use vendorboard_core::{Product, Vendor, VendorId};

use crate::error::Result;
use crate::products::ProductService;
use crate::vendors::VendorService;

/// One vendor's share of the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorShare {
    /// Vendor
    pub vendor_id: VendorId,

    /// Vendor name
    pub name: String,

    /// Products registered
    pub products: u32,

    /// Share of all products, 0-100
    pub share: f64,
}

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Number of vendors
    pub vendor_count: usize,

    /// Number of products
    pub product_count: usize,

    /// Products with stage 1 approval
    pub approved_count: usize,

    /// Per-vendor distribution, largest first
    pub distribution: Vec<VendorShare>,
}

impl DashboardSummary {
    /// Compute the summary from full listings.
    pub fn from_listings(vendors: &[Vendor], products: &[Product]) -> Self {
        let mut per_vendor: HashMap<&VendorId, u32> = HashMap::new();
        for product in products {
            *per_vendor.entry(&product.vendor_id).or_default() += 1;
        }

        let total = products.len();
        let mut distribution: Vec<VendorShare> = vendors
            .iter()
            .map(|vendor| {
                let count = per_vendor.get(&vendor.id).copied().unwrap_or(0);
                VendorShare {
                    vendor_id: vendor.id.clone(),
                    name: vendor.name.clone(),
                    products: count,
                    share: if total == 0 {
                        0.0
                    } else {
                        f64::from(count) * 100.0 / total as f64
                    },
                }
            })
            .collect();
        distribution.sort_by(|a, b| b.products.cmp(&a.products).then_with(|| a.name.cmp(&b.name)));

        Self {
            vendor_count: vendors.len(),
            product_count: total,
            approved_count: products.iter().filter(|p| p.is_approved()).count(),
            distribution,
        }
    }

    /// Vendor with the most products, if any vendor has one.
    pub fn top_vendor(&self) -> Option<&VendorShare> {
        self.distribution.first().filter(|share| share.products > 0)
    }
}

/// Builds the dashboard from the cached listings.
#[derive(Clone)]
pub struct DashboardService {
    vendors: VendorService,
    products: ProductService,
}

impl DashboardService {
    /// Create the service.
    pub fn new(vendors: VendorService, products: ProductService) -> Self {
        Self { vendors, products }
    }

    /// Current summary.
    pub async fn summary(&self) -> Result<DashboardSummary> {
        let (vendors, products) = tokio::try_join!(self.vendors.list(), self.products.list())?;
        Ok(DashboardSummary::from_listings(&vendors, &products))
    }
}

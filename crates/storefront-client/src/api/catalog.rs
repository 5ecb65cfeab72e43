//! Product browsing and search

use serde::Deserialize;

use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

/// One page of the product listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page: u32,
    pub total_pages: u32,
}

impl StorefrontClient {
    /// List products, one page at a time (pages are 1-based).
    pub async fn products(&self, page: u32) -> Result<ProductPage> {
        self.execute_json(
            OutboundRequest::get("/api/products").query("page", page.to_string()),
        )
        .await
    }

    /// Fetch a single product.
    pub async fn product(&self, id: u64) -> Result<Product> {
        self.execute_json(OutboundRequest::get(format!("/api/products/{id}")))
            .await
    }

    /// Full-text product search.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        self.execute_json(OutboundRequest::get("/api/products/search").query("q", query))
            .await
    }
}

//! Shopping cart

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: u64,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_cents: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemChange {
    product_id: u64,
    quantity: u32,
}

impl StorefrontClient {
    /// The signed-in user's cart.
    pub async fn cart(&self) -> Result<Cart> {
        self.execute_json(OutboundRequest::get("/api/cart")).await
    }

    /// Add `quantity` of a product, returning the updated cart.
    pub async fn add_item(&self, product_id: u64, quantity: u32) -> Result<Cart> {
        self.execute_json(
            OutboundRequest::post("/api/cart/items").json(ItemChange { product_id, quantity }),
        )
        .await
    }

    /// Set the quantity of a product already in the cart.
    pub async fn update_item(&self, product_id: u64, quantity: u32) -> Result<Cart> {
        self.execute_json(
            OutboundRequest::put(format!("/api/cart/items/{product_id}"))
                .json(serde_json::json!({ "quantity": quantity })),
        )
        .await
    }

    /// Remove a product from the cart.
    pub async fn remove_item(&self, product_id: u64) -> Result<Cart> {
        self.execute_json(OutboundRequest::delete(format!("/api/cart/items/{product_id}")))
            .await
    }
}

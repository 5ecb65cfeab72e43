//! Checkout and order management
//!
//! Checkout carries an `idempotency-key` header so a retried submission
//! (by the user, not by this client) cannot double-charge. The pickup QR
//! arrives as base64 PNG inside JSON and is decoded to raw image bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    pub total_cents: u64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct QrResponse {
    /// Base64-encoded PNG
    image: String,
}

impl StorefrontClient {
    /// Place an order from the current cart.
    pub async fn checkout(&self) -> Result<Order> {
        let key = uuid::Uuid::new_v4().to_string();
        self.execute_json(
            OutboundRequest::post("/api/orders/checkout").header("idempotency-key", key),
        )
        .await
    }

    /// All orders of the signed-in user, newest first.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.execute_json(OutboundRequest::get("/api/orders")).await
    }

    /// A single order.
    pub async fn order(&self, id: u64) -> Result<Order> {
        self.execute_json(OutboundRequest::get(format!("/api/orders/{id}")))
            .await
    }

    /// Cancel an order that has not shipped yet.
    pub async fn cancel_order(&self, id: u64) -> Result<Order> {
        self.execute_json(OutboundRequest::post(format!("/api/orders/{id}/cancel")))
            .await
    }

    /// The pickup QR code for an order, as PNG bytes.
    pub async fn order_qr(&self, id: u64) -> Result<Vec<u8>> {
        let response: QrResponse = self
            .execute_json(OutboundRequest::get(format!("/api/orders/{id}/qr")))
            .await?;
        BASE64
            .decode(response.image.as_bytes())
            .map_err(|e| Error::InvalidResponse(format!("qr image is not valid base64: {e}")))
    }
}

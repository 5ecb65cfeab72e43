//! Support email

use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

impl StorefrontClient {
    /// Send a support email on behalf of the signed-in user.
    pub async fn send_support_email(&self, subject: &str, body: &str) -> Result<()> {
        self.execute_unit(
            OutboundRequest::post("/api/support/email")
                .json(serde_json::json!({ "subject": subject, "body": body })),
        )
        .await
    }
}

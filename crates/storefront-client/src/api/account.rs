//! Current-user profile

use serde::Deserialize;

use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

/// The signed-in user's profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl StorefrontClient {
    /// Fetch the profile of the signed-in user.
    pub async fn me(&self) -> Result<User> {
        self.execute_json(OutboundRequest::get("/users/me")).await
    }
}

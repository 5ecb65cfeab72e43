//! Authentication flows
//!
//! Sign-in and sign-up are public (no bearer token even when a stale one is
//! stored); sign-out is protected. The refresh flow is internal to the
//! transport and not exposed here.

use serde::Serialize;
use storefront_session::TokenPair;

use crate::endpoints;
use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// New-account registration payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl StorefrontClient {
    /// Sign in and persist the issued token pair in the session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair> {
        let pair: TokenPair = self
            .execute_json(
                OutboundRequest::post(endpoints::SIGN_IN)
                    .json(SignInRequest { email, password }),
            )
            .await?;
        self.session().store_pair(&pair)?;
        Ok(pair)
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        self.execute_unit(OutboundRequest::post(endpoints::SIGN_UP).json(request))
            .await
    }

    /// Invalidate the session server-side, then clear it locally.
    ///
    /// The local session is cleared even when the server call fails, so a
    /// dead backend cannot trap the user in a signed-in state.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self
            .execute_unit(OutboundRequest::post(endpoints::SIGN_OUT))
            .await;
        self.session().clear()?;
        result
    }

    /// Request a password reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.execute_unit(
            OutboundRequest::post(endpoints::FORGOT_PASSWORD)
                .json(serde_json::json!({ "email": email })),
        )
        .await
    }

    /// Complete a password reset with the emailed code.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<()> {
        self.execute_unit(
            OutboundRequest::post(endpoints::RESET_PASSWORD)
                .json(serde_json::json!({ "code": code, "newPassword": new_password })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_session::MemoryTokenStore;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> StorefrontClient {
        StorefrontClient::builder()
            .base_url(server.uri())
            .token_store(Arc::new(MemoryTokenStore::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn sign_in_stores_the_issued_pair() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/users/signin"))
            .and(body_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "hunter2",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "at_1",
                "refreshToken": "rt_1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pair = client.sign_in("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(pair.access_token, "at_1");
        assert_eq!(
            client.session().access_token().unwrap().as_deref(),
            Some("at_1")
        );
        assert!(client.session().is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn failed_sign_in_stores_nothing() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/users/signin"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let err = client.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, crate::Error::Api { status: 400, .. }), "got {err:?}");
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn sign_out_clears_session_even_when_server_rejects() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        client
            .session()
            .store_pair(&TokenPair::new("at_1", "rt_1"))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/users/signout"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.sign_out().await;
        assert!(result.is_err());
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn sign_out_calls_server_with_bearer_then_clears() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        client
            .session()
            .store_pair(&TokenPair::new("at_1", "rt_1"))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/users/signout"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client.sign_out().await.unwrap();
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn password_reset_flow_hits_public_endpoints() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/users/forgot-password"))
            .and(body_json(serde_json::json!({"email": "ada@example.com"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users/reset-password"))
            .and(body_json(serde_json::json!({
                "code": "123456",
                "newPassword": "s3cret",
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client.forgot_password("ada@example.com").await.unwrap();
        client.reset_password("123456", "s3cret").await.unwrap();
    }
}

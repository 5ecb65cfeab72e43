//! Client construction and base-URL resolution
//!
//! The base URL mirrors the front-end's environment switch: inside the
//! compose network the backend is reachable as `backend`, on a developer
//! machine as `localhost`, both on port 8080. Tests and services always
//! pass an explicit URL instead.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use storefront_session::{Session, SignoutObserver, TokenStore};

use crate::error::{Error, Result};
use crate::transport::StorefrontClient;

/// Environment flag selecting the containerized host alias.
pub const DOCKER_ENV_FLAG: &str = "STOREFRONT_DOCKER";

const DOCKER_BASE_URL: &str = "http://backend:8080";
const LOCAL_BASE_URL: &str = "http://localhost:8080";

const DEFAULT_USER_AGENT: &str = concat!("storefront-client/", env!("CARGO_PKG_VERSION"));

/// Resolve the backend base URL from the environment.
///
/// `STOREFRONT_DOCKER=1` (or `true`) selects the compose host alias,
/// anything else selects localhost.
pub fn resolve_base_url() -> String {
    match std::env::var(DOCKER_ENV_FLAG) {
        Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => DOCKER_BASE_URL.to_owned(),
        _ => LOCAL_BASE_URL.to_owned(),
    }
}

/// Builder for [`StorefrontClient`].
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
    observer: Option<Arc<dyn SignoutObserver>>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Override the environment-resolved base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Token store backing the session (required).
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Observer notified on forced signout; defaults to logging.
    pub fn signout_observer(mut self, observer: Arc<dyn SignoutObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    ///
    /// The underlying HTTP client carries no total timeout: a hung request
    /// stalls its caller, matching the original front-end.
    pub fn build(self) -> Result<StorefrontClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(resolve_base_url)
            .trim_end_matches('/')
            .to_owned();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }

        let store = self
            .store
            .ok_or_else(|| Error::Config("token_store is required".into()))?;

        let user_agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.into());
        HeaderValue::from_str(&user_agent)
            .map_err(|_| Error::Config(format!("user_agent is not a valid header: {user_agent}")))?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(Error::Transport)?;

        let session = match self.observer {
            Some(observer) => Session::with_observer(store, observer),
            None => Session::new(store),
        };

        Ok(StorefrontClient::from_parts(http, base_url, session))
    }
}

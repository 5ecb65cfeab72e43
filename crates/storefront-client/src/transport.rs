//! Request execution and centralized auth recovery
//!
//! The transport executes what the middleware decides: attach the bearer
//! credential [`authorize`] picked, send, and on failure act on the
//! [`recovery`] classification. A recoverable 401 funnels through the
//! session's single-flight gate, so any number of concurrent 401s cost one
//! refresh call, then each original request is resubmitted exactly once
//! with the fresh token.
//!
//! The refresh call itself travels through this same transport. Its path is
//! the refresh endpoint, which recovery classifies as terminal, so a
//! rejected refresh can never trigger another refresh.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use tracing::{Instrument, debug, debug_span, warn};

use storefront_session::{RefreshError, RefreshFuture, RefreshGate, Session, TokenPair};

use crate::endpoints;
use crate::error::{Error, Result};
use crate::middleware::{Recovery, SignoutCause, authorize, recovery};
use crate::request::OutboundRequest;

/// The authenticated storefront API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the session, and
/// the refresh gate, so the single-refresh-in-flight invariant holds across
/// every clone in the process.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    gate: RefreshGate,
}

impl StorefrontClient {
    pub(crate) fn from_parts(http: reqwest::Client, base_url: String, session: Session) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                session,
                gate: RefreshGate::new(),
            }),
        }
    }

    pub fn builder() -> crate::config::ClientBuilder {
        crate::config::ClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The session behind this client, for embedders that need to inspect
    /// or clear it directly.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Execute a described request with auth attachment and recovery.
    ///
    /// Success returns the raw response; every non-success status becomes an
    /// `Err` after recovery has run its course.
    pub(crate) async fn execute(&self, mut request: OutboundRequest) -> Result<reqwest::Response> {
        loop {
            let response = self.send_once(&request).await?;
            let status = response.status().as_u16();
            if response.status().is_success() {
                return Ok(response);
            }

            let has_refresh = self.inner.session.refresh_token()?.is_some();
            match recovery::classify(&request.path, status, request.retried, has_refresh) {
                Recovery::Propagate => {
                    let message = failure_message(response).await;
                    return Err(Error::from_status(status, message));
                }
                Recovery::ForceSignout(cause) => {
                    let message = failure_message(response).await;
                    warn!(path = %request.path, status, ?cause, "unrecoverable auth failure");
                    self.inner.session.revoke(revoke_reason(cause))?;
                    return Err(Error::from_status(status, message));
                }
                Recovery::RefreshAndRetry => {
                    debug!(path = %request.path, "401 with refresh token, refreshing session");
                    request.retried = true;
                    match self.refresh_session().await {
                        // Loop resubmits; authorize re-reads the store, so
                        // the retry carries the freshly issued token
                        Ok(_) => continue,
                        Err(e) => {
                            self.inner.session.revoke("session refresh failed")?;
                            return Err(Error::RefreshFailed(e));
                        }
                    }
                }
            }
        }
    }

    /// Execute and deserialize a JSON response body.
    pub(crate) async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: OutboundRequest,
    ) -> Result<T> {
        let response = self.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Execute a request whose response body is irrelevant.
    pub(crate) async fn execute_unit(&self, request: OutboundRequest) -> Result<()> {
        self.execute(request).await.map(drop)
    }

    /// One wire round trip: credentials, request id, body, no retries.
    async fn send_once(&self, request: &OutboundRequest) -> Result<reqwest::Response> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        let span = debug_span!(
            "request",
            method = %request.method,
            path = %request.path,
            %request_id,
            retried = request.retried,
        );

        let url = format!("{}{}", self.inner.base_url, request.path);
        let access_token = self.inner.session.access_token()?;
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .header("x-request-id", request_id);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(bearer) = authorize::bearer_for(&request.path, access_token.as_deref()) {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        async move {
            let response = builder.send().await.map_err(Error::Transport)?;
            debug!(status = response.status().as_u16(), "response received");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Join or initiate the single-flight refresh and persist its result.
    ///
    /// Boxed to break the `execute` -> `refresh_session` -> `call_refresh`
    /// -> `execute` auto-trait cycle the compiler cannot resolve otherwise.
    fn refresh_session(&self) -> RefreshFuture {
        let this = self.clone();
        Box::pin(async move {
            let client = this.clone();
            this.inner
                .gate
                .run(move || Box::pin(async move { client.call_refresh().await }))
                .await
        })
    }

    /// The actual refresh round trip, run by at most one wave member.
    async fn call_refresh(&self) -> std::result::Result<TokenPair, RefreshError> {
        let refresh_token = self
            .inner
            .session
            .refresh_token()
            .map_err(|e| RefreshError::Store(e.to_string()))?
            .ok_or(RefreshError::MissingToken)?;

        let request = OutboundRequest::post(endpoints::REFRESH)
            .json(serde_json::json!({ "refreshToken": refresh_token }));

        let response = self.execute(request).await.map_err(|e| match e {
            Error::Transport(e) => RefreshError::Transport(e.to_string()),
            Error::Session(e) => RefreshError::Store(e.to_string()),
            other => RefreshError::Rejected(other.to_string()),
        })?;

        let pair: TokenPair = response
            .json()
            .await
            .map_err(|e| RefreshError::Invalid(e.to_string()))?;

        // Persist before any waiter resumes so their retries read the new token
        self.inner
            .session
            .store_pair(&pair)
            .map_err(|e| RefreshError::Store(e.to_string()))?;

        debug!("session refreshed");
        Ok(pair)
    }
}

fn revoke_reason(cause: SignoutCause) -> &'static str {
    match cause {
        SignoutCause::RefreshEndpointFailed => "refresh endpoint rejected",
        SignoutCause::NoRefreshToken => "unauthorized with no refresh token",
        SignoutCause::RetryExhausted => "still unauthorized after refresh",
        SignoutCause::Forbidden => "forbidden",
    }
}

/// Best-effort error body; falls back to the status line.
async fn failure_message(response: reqwest::Response) -> String {
    let status = response.status();
    response.text().await.unwrap_or_else(|_| status.to_string())
}

//! Authenticated HTTP client for the storefront backend
//!
//! Every call flows through an explicit middleware pair instead of implicit
//! interceptors: [`middleware::authorize`] decides whether a request gets a
//! bearer credential, [`middleware::recovery`] classifies a failed response.
//! The [`transport`] merely executes those decisions: attach the token, send,
//! and on a 401 funnel one refresh through the session's single-flight gate
//! before resubmitting the original request exactly once.
//!
//! Request flow:
//! 1. Caller invokes a typed endpoint method ([`api`])
//! 2. `authorize` attaches `Authorization: Bearer <token>` unless the path
//!    is on the public allow-list ([`endpoints`])
//! 3. On a non-success response, `recovery` picks one of: refresh-and-retry,
//!    force signout, or propagate unchanged
//! 4. Unrecoverable auth failures revoke the session, which notifies the
//!    embedder's `SignoutObserver` with the login path
//!
//! Streaming chat ([`api::assistant`]) bypasses the middleware pipeline and
//! is never retried; see [`stream`].

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod request;
pub mod stream;
pub mod transport;

pub use config::{ClientBuilder, resolve_base_url};
pub use error::{Error, Result};
pub use request::OutboundRequest;
pub use transport::StorefrontClient;

pub use storefront_session::{
    FileTokenStore, LogSignout, MemoryTokenStore, Session, SignoutObserver, TokenPair, TokenStore,
};

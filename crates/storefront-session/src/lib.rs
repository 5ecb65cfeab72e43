//! Session state for the storefront API client
//!
//! Owns everything about the authenticated session except the HTTP calls
//! themselves: the token pair model, the persistent key-value token store,
//! the session lifecycle (initialize from storage, update on sign-in and
//! refresh, clear on sign-out, revoke on unrecoverable auth failure), and
//! the single-flight gate that collapses concurrent refresh attempts into
//! one backend call.
//!
//! Session flow:
//! 1. Embedder opens a [`TokenStore`] (file-backed or in-memory) and wraps
//!    it in a [`Session`], optionally with a custom [`SignoutObserver`]
//! 2. Sign-in stores the resulting pair via [`Session::store_pair`]
//! 3. The client reads tokens per request via [`Session::access_token`]
//! 4. On 401, the client funnels its refresh call through [`RefreshGate`]
//! 5. Unrecoverable failures call [`Session::revoke`], which clears both
//!    keys and notifies the observer with the login path

pub mod constants;
pub mod error;
pub mod refresh;
pub mod session;
pub mod store;
pub mod tokens;

pub use constants::{ACCESS_TOKEN_KEY, LOGIN_PATH, REFRESH_TOKEN_KEY};
pub use error::{Error, Result};
pub use refresh::{RefreshError, RefreshFuture, RefreshGate};
pub use session::{LogSignout, Session, SignoutObserver};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use tokens::TokenPair;

//! Fixed session constants
//!
//! The two storage keys mirror the keys the web front-end used in browser
//! local storage, so a token file written by one embedder is readable by
//! another. The login path is where embedders send the user after a forced
//! signout.

/// Storage key holding the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key holding the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Redirect target delivered to the signout observer on revocation
pub const LOGIN_PATH: &str = "/signin";

//! Backend paths and the public-endpoint allow-list
//!
//! The allow-list is matched exactly: a path either is one of the five
//! no-auth endpoints or it is protected. Prefix matching would let a
//! crafted path like `/users/signin/../../admin` dodge the bearer token,
//! so only full-string equality counts.

/// Sign in with email and password, returns a token pair
pub const SIGN_IN: &str = "/users/signin";

/// Create an account
pub const SIGN_UP: &str = "/users/signup";

/// Exchange a refresh token for a new token pair
pub const REFRESH: &str = "/users/refresh";

/// Request a password reset email
pub const FORGOT_PASSWORD: &str = "/users/forgot-password";

/// Complete a password reset with the emailed code
pub const RESET_PASSWORD: &str = "/users/reset-password";

/// Invalidate the current session server-side (protected)
pub const SIGN_OUT: &str = "/users/signout";

/// Paths reachable without a bearer token.
pub const PUBLIC_ENDPOINTS: &[&str] =
    &[SIGN_IN, SIGN_UP, REFRESH, FORGOT_PASSWORD, RESET_PASSWORD];

/// Whether `path` is on the public allow-list (exact match).
pub fn is_public(path: &str) -> bool {
    PUBLIC_ENDPOINTS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_covers_the_five_auth_flows() {
        assert!(is_public(SIGN_IN));
        assert!(is_public(SIGN_UP));
        assert!(is_public(REFRESH));
        assert!(is_public(FORGOT_PASSWORD));
        assert!(is_public(RESET_PASSWORD));
    }

    #[test]
    fn protected_paths_are_not_public() {
        assert!(!is_public("/api/orders"));
        assert!(!is_public("/users/me"));
        assert!(!is_public(SIGN_OUT));
    }

    #[test]
    fn matching_is_exact_not_prefix() {
        assert!(!is_public("/users/signin/extra"));
        assert!(!is_public("/users/signin?next=/admin"));
        assert!(!is_public("/users"));
    }
}

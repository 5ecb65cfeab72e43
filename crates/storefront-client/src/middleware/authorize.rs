//! Bearer-token attachment decision
//!
//! Public allow-list paths never carry credentials, even when a stale token
//! sits in the store. Protected paths carry whatever access token the
//! session currently holds; with no token the request goes out bare and the
//! server's rejection flows through recovery.

use crate::endpoints;

/// The `Authorization` header value for a request, if any.
pub fn bearer_for(path: &str, access_token: Option<&str>) -> Option<String> {
    if endpoints::is_public(path) {
        return None;
    }
    access_token.map(|token| format!("Bearer {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_path_with_token_gets_bearer_header() {
        assert_eq!(
            bearer_for("/api/orders", Some("t1")),
            Some("Bearer t1".into())
        );
    }

    #[test]
    fn protected_path_without_token_goes_out_bare() {
        assert_eq!(bearer_for("/api/orders", None), None);
    }

    #[test]
    fn public_path_ignores_stored_token() {
        // A stale token must not leak onto sign-in
        assert_eq!(bearer_for("/users/signin", Some("stale")), None);
        assert_eq!(bearer_for("/users/refresh", Some("stale")), None);
    }

    #[test]
    fn sign_out_is_protected_and_gets_the_token() {
        assert_eq!(
            bearer_for("/users/signout", Some("t1")),
            Some("Bearer t1".into())
        );
    }
}

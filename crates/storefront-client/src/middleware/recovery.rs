//! Failure classification for the response side of the pipeline
//!
//! Given the facts about a failed request (path, status, whether it was
//! already resubmitted, whether a refresh token exists), decide one of three
//! outcomes. Rule order matters:
//!
//! 1. refresh endpoint failing ⇒ force signout, never refresh again (this
//!    rule is the recursion guard for the refresh call itself)
//! 2. first 401 with a refresh token ⇒ refresh and retry once
//! 3. remaining 401/403 ⇒ force signout
//! 4. everything else propagates unchanged

use crate::endpoints;

/// Why the session is being revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignoutCause {
    /// The refresh endpoint itself rejected the call
    RefreshEndpointFailed,
    /// 401 with no refresh token to recover with
    NoRefreshToken,
    /// 401 on a request that was already resubmitted once
    RetryExhausted,
    /// 403 — authenticated but not allowed
    Forbidden,
}

/// What the transport should do with a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Mark the request retried, run the shared refresh, resubmit once
    RefreshAndRetry,
    /// Clear the session, notify the observer, propagate the error
    ForceSignout(SignoutCause),
    /// Not an auth failure; surface unchanged
    Propagate,
}

/// Classify a non-success response.
pub fn classify(path: &str, status: u16, retried: bool, has_refresh_token: bool) -> Recovery {
    if path == endpoints::REFRESH {
        return Recovery::ForceSignout(SignoutCause::RefreshEndpointFailed);
    }

    if status == 401 && !retried && has_refresh_token {
        return Recovery::RefreshAndRetry;
    }

    match status {
        401 if retried => Recovery::ForceSignout(SignoutCause::RetryExhausted),
        401 => Recovery::ForceSignout(SignoutCause::NoRefreshToken),
        403 => Recovery::ForceSignout(SignoutCause::Forbidden),
        _ => Recovery::Propagate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_401_with_refresh_token_retries() {
        assert_eq!(
            classify("/api/orders", 401, false, true),
            Recovery::RefreshAndRetry
        );
    }

    #[test]
    fn second_401_is_terminal() {
        assert_eq!(
            classify("/api/orders", 401, true, true),
            Recovery::ForceSignout(SignoutCause::RetryExhausted)
        );
    }

    #[test]
    fn missing_refresh_token_skips_straight_to_signout() {
        assert_eq!(
            classify("/api/orders", 401, false, false),
            Recovery::ForceSignout(SignoutCause::NoRefreshToken)
        );
    }

    #[test]
    fn refresh_endpoint_failure_never_refreshes_again() {
        // Any status on the refresh path is terminal, including its own 401
        assert_eq!(
            classify("/users/refresh", 401, false, true),
            Recovery::ForceSignout(SignoutCause::RefreshEndpointFailed)
        );
        assert_eq!(
            classify("/users/refresh", 500, false, true),
            Recovery::ForceSignout(SignoutCause::RefreshEndpointFailed)
        );
    }

    #[test]
    fn forbidden_signs_out_without_retry() {
        assert_eq!(
            classify("/api/admin/traffic", 403, false, true),
            Recovery::ForceSignout(SignoutCause::Forbidden)
        );
    }

    #[test]
    fn non_auth_errors_propagate() {
        assert_eq!(classify("/api/orders", 404, false, true), Recovery::Propagate);
        assert_eq!(classify("/api/orders", 422, false, true), Recovery::Propagate);
        assert_eq!(classify("/api/orders", 500, false, true), Recovery::Propagate);
        assert_eq!(classify("/api/orders", 502, true, false), Recovery::Propagate);
    }
}

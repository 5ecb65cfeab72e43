//! Session lifecycle over a token store
//!
//! One `Session` per authenticated identity. It is a typed facade over the
//! two fixed storage keys: reads go straight through to the store (the
//! store is the source of truth, exactly like local storage was for the
//! web front-end), writes happen on sign-in/refresh, and removal happens on
//! sign-out or revocation.
//!
//! Revocation is the Rust analogue of the front-end's hard redirect to the
//! login view: both token keys are cleared and the injected
//! [`SignoutObserver`] receives the fixed login path. Embedders decide what
//! "redirect" means for them (navigate, flip a gauge, prompt again).

use std::sync::Arc;

use tracing::{info, warn};

use crate::constants::{ACCESS_TOKEN_KEY, LOGIN_PATH, REFRESH_TOKEN_KEY};
use crate::error::Result;
use crate::store::TokenStore;
use crate::tokens::TokenPair;

/// Receives forced-signout notifications.
///
/// Called at most once per revocation wave: repeated revocations without an
/// intervening sign-in only notify on the first call that actually cleared
/// something.
pub trait SignoutObserver: Send + Sync {
    /// The session was cleared due to an unrecoverable auth failure;
    /// `login_path` is where the user must re-authenticate.
    fn session_revoked(&self, login_path: &str);
}

/// Default observer: records the event in the log and nothing else.
pub struct LogSignout;

impl SignoutObserver for LogSignout {
    fn session_revoked(&self, login_path: &str) {
        warn!(login_path, "session revoked, sign-in required");
    }
}

/// The authenticated session: token access, updates, and revocation.
pub struct Session {
    store: Arc<dyn TokenStore>,
    observer: Arc<dyn SignoutObserver>,
}

impl Session {
    /// Create a session over the given store with the logging observer.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self::with_observer(store, Arc::new(LogSignout))
    }

    pub fn with_observer(store: Arc<dyn TokenStore>, observer: Arc<dyn SignoutObserver>) -> Self {
        Self { store, observer }
    }

    /// Inspect the store at startup. Returns whether a signed-in session
    /// (at least an access token) is already present.
    pub fn initialize(&self) -> Result<bool> {
        let has_access = self.store.get(ACCESS_TOKEN_KEY)?.is_some();
        let has_refresh = self.store.get(REFRESH_TOKEN_KEY)?.is_some();
        info!(has_access, has_refresh, "session initialized from store");
        Ok(has_access)
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Store a freshly issued pair (sign-in or refresh success), replacing
    /// whatever was there.
    pub fn store_pair(&self, pair: &TokenPair) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &pair.refresh_token)?;
        Ok(())
    }

    /// Remove both token keys (sign-out). Returns whether anything was
    /// actually removed.
    pub fn clear(&self) -> Result<bool> {
        let removed_access = self.store.remove(ACCESS_TOKEN_KEY)?;
        let removed_refresh = self.store.remove(REFRESH_TOKEN_KEY)?;
        Ok(removed_access || removed_refresh)
    }

    /// Clear the session after an unrecoverable auth failure and notify the
    /// observer with the login path. A second revocation while already
    /// signed out is a no-op, so callers may revoke defensively.
    pub fn revoke(&self, reason: &str) -> Result<()> {
        if self.clear()? {
            warn!(reason, login_path = LOGIN_PATH, "session revoked");
            self.observer.session_revoked(LOGIN_PATH);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use std::sync::Mutex;

    /// Observer that records every notification it receives.
    struct RecordingObserver {
        revocations: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                revocations: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.revocations.lock().unwrap().clone()
        }
    }

    impl SignoutObserver for RecordingObserver {
        fn session_revoked(&self, login_path: &str) {
            self.revocations.lock().unwrap().push(login_path.to_owned());
        }
    }

    fn session_with_observer() -> (Session, Arc<RecordingObserver>) {
        let observer = RecordingObserver::new();
        let session = Session::with_observer(Arc::new(MemoryTokenStore::new()), observer.clone());
        (session, observer)
    }

    #[test]
    fn starts_unauthenticated() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(!session.initialize().unwrap());
        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.access_token().unwrap(), None);
        assert_eq!(session.refresh_token().unwrap(), None);
    }

    #[test]
    fn store_pair_then_read_back() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();

        assert!(session.is_authenticated().unwrap());
        assert_eq!(session.access_token().unwrap().as_deref(), Some("at_1"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("rt_1"));
    }

    #[test]
    fn store_pair_overwrites_previous_session() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();
        session.store_pair(&TokenPair::new("at_2", "rt_2")).unwrap();

        assert_eq!(session.access_token().unwrap().as_deref(), Some("at_2"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("rt_2"));
    }

    #[test]
    fn clear_removes_both_keys() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();

        assert!(session.clear().unwrap());
        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.refresh_token().unwrap(), None);

        // Nothing left to clear
        assert!(!session.clear().unwrap());
    }

    #[test]
    fn revoke_clears_and_notifies_with_login_path() {
        let (session, observer) = session_with_observer();
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();

        session.revoke("refresh rejected").unwrap();

        assert!(!session.is_authenticated().unwrap());
        assert_eq!(observer.seen(), vec![LOGIN_PATH.to_owned()]);
    }

    #[test]
    fn second_revoke_does_not_notify_again() {
        let (session, observer) = session_with_observer();
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();

        session.revoke("first").unwrap();
        session.revoke("second").unwrap();

        assert_eq!(observer.seen().len(), 1);
    }

    #[test]
    fn revoke_after_new_sign_in_notifies_again() {
        let (session, observer) = session_with_observer();
        session.store_pair(&TokenPair::new("at_1", "rt_1")).unwrap();
        session.revoke("first").unwrap();

        session.store_pair(&TokenPair::new("at_2", "rt_2")).unwrap();
        session.revoke("second").unwrap();

        assert_eq!(observer.seen().len(), 2);
    }

    #[test]
    fn revoke_on_empty_session_is_silent() {
        let (session, observer) = session_with_observer();
        session.revoke("nothing stored").unwrap();
        assert!(observer.seen().is_empty());
    }

    #[test]
    fn access_token_may_exist_without_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "at_only").unwrap();

        let session = Session::new(store);
        assert!(session.is_authenticated().unwrap());
        assert_eq!(session.refresh_token().unwrap(), None);
    }
}

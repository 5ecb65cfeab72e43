//! Request-augmentation and failure-recovery middleware
//!
//! Both halves are pure functions over request/response facts, so the
//! cross-cutting auth behavior is testable without a transport. The
//! transport executes whatever these modules decide.

pub mod authorize;
pub mod recovery;

pub use authorize::bearer_for;
pub use recovery::{Recovery, SignoutCause, classify};

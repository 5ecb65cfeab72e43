//! Shared types for the storefront workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;

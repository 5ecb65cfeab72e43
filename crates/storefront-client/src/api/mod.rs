//! Typed endpoint wrappers
//!
//! Thin methods over the transport, one module per backend area. All of
//! them inherit the middleware semantics: bearer attachment, single-flight
//! refresh, forced signout on unrecoverable auth failures. The assistant
//! module is the one exception; its streaming call bypasses the pipeline
//! and is never retried.

pub mod account;
pub mod assistant;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod support;
pub mod traffic;

//! Auth types shared across Hapa crates.
//!
//! Provides JWT signing and validation, the bearer-token extractors, and the
//! role gate used by privileged routes.

pub mod bearer;
pub mod role;
pub mod token;

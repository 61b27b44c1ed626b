//! Domain types shared across Hapa crates.
//!
//! Pure types with no framework dependencies. Import in `usecase/` and
//! `domain/` layers freely.

pub mod id;
pub mod phone;
pub mod user;

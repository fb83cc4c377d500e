//! Domain types shared across all Kitob services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod handshake;
pub mod phone;
pub mod user;

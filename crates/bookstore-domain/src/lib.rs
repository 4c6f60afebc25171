//! Domain types shared across the bookstore crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod actor;
pub mod book;
pub mod pagination;
pub mod policy;
pub mod user;

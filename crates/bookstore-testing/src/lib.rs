//! Test utilities for the bookstore crates.
//!
//! Import from `[dev-dependencies]` only.

pub mod auth;

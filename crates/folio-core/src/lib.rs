//! Core types and trait definitions for Folio.
//!
//! Folio keeps one base resume and any number of *scoped* resumes: named
//! variants that include a subset of the base skills and work history and may
//! override individual text fields without touching the base record.
//!
//! This crate has no HTTP or database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod base;
pub mod effective;
pub mod error;
pub mod guard;
pub mod scoped;
pub mod store;

pub use error::{EntityKind, Error, Result, StoreError};

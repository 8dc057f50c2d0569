//! SQLite backend for Folio.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every trait method executes inside a
//! single rusqlite transaction.

mod encode;
mod guard;
mod overlay;
mod resolve;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

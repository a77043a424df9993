//! SQLite backend for the docket ticket store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single connection also
//! serializes writes, which is what makes the per-workspace ticket-number
//! counter a true atomic increment-and-read.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

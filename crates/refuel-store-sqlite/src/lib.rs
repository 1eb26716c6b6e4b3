//! SQLite backend for the device-token registry.
//!
//! Queries go through [`tokio_rusqlite`], which owns the connection on its
//! own thread and hands results back over a channel.

mod registry;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use registry::SqliteTokenRegistry;

#[cfg(test)]
mod tests;

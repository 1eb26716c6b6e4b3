//! Core types and trait definitions for the refuel backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! remote collaborators (CRM object store, payment gateway, device-token
//! registry) are expressed as traits; concrete clients live in other crates.

pub mod contact;
pub mod error;
pub mod payments;
pub mod registry;
pub mod store;
pub mod task;
pub mod vehicle;

pub use error::{Error, Result};

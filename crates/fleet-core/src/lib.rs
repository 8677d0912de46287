//! Core domain types and the contract lifecycle engine for the Fleet rental
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod client;
pub mod conflict;
pub mod contract;
pub mod error;
pub mod machine;
pub mod service;
pub mod store;
pub mod sweep;
pub mod validate;
pub mod vehicle;

pub use error::{Error, Result};

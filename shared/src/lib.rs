//! Shared types and pure logic for the Acopio stock ledger
//!
//! This crate holds everything that does not touch storage: domain models,
//! the material catalog, stock validation, trip classification and the
//! reconciliation checks. It is used by the backend and, through WASM, by the
//! browser client.

pub mod catalog;
pub mod classification;
pub mod models;
pub mod reconciliation;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use classification::*;
pub use models::*;
pub use reconciliation::*;
pub use types::*;
pub use validation::*;

//! Domain models for the depot stock ledger

mod discrepancy;
mod inventory;
mod location;
mod machine;
mod report;
mod sale;

pub use discrepancy::*;
pub use inventory::*;
pub use location::*;
pub use machine::*;
pub use report::*;
pub use sale::*;

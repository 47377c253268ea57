//! Ledger, journal, translation and reconciliation services

pub mod catalog;
pub mod journal;
pub mod ledger;
pub mod reconciliation;
pub mod translator;

pub use catalog::CatalogService;
pub use journal::{verify_movement_chain, ChainBreak, ChainProblem, MovementJournal};
pub use ledger::{OperationResult, StockLedger};
pub use reconciliation::ReconciliationService;
pub use translator::{ReportTranslation, ReportTranslator, TranslationOutcome};

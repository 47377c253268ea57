//! Turns trip reports into ledger entries and exits

use std::sync::Arc;

use serde::Serialize;
use shared::{
    classify_trip, non_blank, DepotMatcher, MovementContext, MovementKind, Report,
    TripClassification,
};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::services::{OperationResult, StockLedger};

/// Machine type assumed for exits whose report names none
const LOADER_MACHINE_TYPE: &str = "loader";

/// What translating one report did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Entry(OperationResult),
    Exit(OperationResult),
    /// Depot exit by a machine that may not draw down stock; ledger untouched
    Rejected { reason: String },
    NotApplicable { reason: String },
    /// The report already produced a journaled movement
    AlreadyApplied { report_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTranslation {
    pub report_id: String,
    #[serde(flatten)]
    pub outcome: TranslationOutcome,
}

pub struct ReportTranslator {
    ledger: Arc<StockLedger>,
    depot: DepotMatcher,
    unspecified_material: String,
    // Holds the duplicate check and the ledger call together
    translate_lock: Mutex<()>,
}

impl ReportTranslator {
    pub fn new(
        ledger: Arc<StockLedger>,
        depot: DepotMatcher,
        unspecified_material: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            depot,
            unspecified_material: unspecified_material.into(),
            translate_lock: Mutex::new(()),
        }
    }

    pub fn depot(&self) -> &DepotMatcher {
        &self.depot
    }

    /// Classify a report and apply the resulting movement, if any
    pub async fn translate(&self, report: &Report) -> AppResult<TranslationOutcome> {
        let classification = classify_trip(report, &self.depot, &self.unspecified_material);

        let (kind, material_name, quantity, counterparty) = match classification {
            TripClassification::NotApplicable { reason } => {
                tracing::debug!(
                    report_id = %report.id,
                    %reason,
                    "Report does not affect inventory"
                );
                return Ok(TranslationOutcome::NotApplicable { reason });
            }
            TripClassification::RejectedExit {
                machine_class,
                reason,
            } => {
                tracing::warn!(
                    report_id = %report.id,
                    machine_class = %machine_class,
                    "Depot exit by non-loader machine not applied"
                );
                return Ok(TranslationOutcome::Rejected { reason });
            }
            TripClassification::Entry {
                material_name,
                quantity,
                origin,
            } => (MovementKind::Entry, material_name, quantity, origin),
            TripClassification::Exit {
                material_name,
                quantity,
                destination,
            } => (MovementKind::Exit, material_name, quantity, destination),
        };

        let _guard = self.translate_lock.lock().await;

        if self.ledger.journal().contains_report(&report.id).await? {
            tracing::info!(report_id = %report.id, "Report already applied; skipping");
            return Ok(TranslationOutcome::AlreadyApplied {
                report_id: report.id.clone(),
            });
        }

        let mut context = MovementContext {
            source_report_id: Some(report.id.clone()),
            actor_machine_id: report.machine_id.clone(),
            actor_machine_name: report.machine_name.clone(),
            actor_user_name: report.user_name.clone(),
            machine_type: non_blank(report.machine_type.as_deref()).map(str::to_string),
            note: Some(format!("trip report {}", report.id)),
            unit_cost: None,
        };

        match kind {
            MovementKind::Entry => {
                let result = self
                    .ledger
                    .apply_entry(&material_name, quantity, &counterparty, context)
                    .await?;
                Ok(TranslationOutcome::Entry(result))
            }
            MovementKind::Exit => {
                // Loader class was established by name when the type is missing
                context
                    .machine_type
                    .get_or_insert_with(|| LOADER_MACHINE_TYPE.to_string());
                let result = self
                    .ledger
                    .apply_exit(&material_name, quantity, &counterparty, context)
                    .await?;
                Ok(TranslationOutcome::Exit(result))
            }
        }
    }

    /// Translate reports in order, one outcome each
    pub async fn translate_all(&self, reports: &[Report]) -> AppResult<Vec<ReportTranslation>> {
        let mut translations = Vec::with_capacity(reports.len());
        for report in reports {
            let outcome = self.translate(report).await?;
            translations.push(ReportTranslation {
                report_id: report.id.clone(),
                outcome,
            });
        }
        Ok(translations)
    }
}

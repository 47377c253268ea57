//! Consistency checks across reports, sales and inventory
//!
//! The engine is a pure function of its snapshot: it never mutates records and
//! keeps no state between runs, so the same snapshot and timestamp always
//! produce the same report.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CapabilityTable, MaterialCatalog};
use crate::models::{
    DepotMatcher, Discrepancy, DiscrepancyCheck, LocationKind, MaterialStock,
    ReconciliationReport, Report, SaleRecord, ValueOrigin,
};
use crate::types::{format_quantity, non_blank, same_name};

/// Point-in-time copy of the three record sets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationSnapshot {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub stock: Vec<MaterialStock>,
}

/// Batch consistency checker
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    depot: DepotMatcher,
}

impl ReconciliationEngine {
    pub fn new(depot: DepotMatcher) -> Self {
        Self { depot }
    }

    /// Run every check and group the results
    pub fn run(
        &self,
        snapshot: &ReconciliationSnapshot,
        detected_at: DateTime<Utc>,
    ) -> ReconciliationReport {
        let mut discrepancies = self.inventory_checks(snapshot, detected_at);
        discrepancies.extend(self.sales_checks(snapshot, detected_at));
        discrepancies.extend(self.report_checks(snapshot, detected_at));

        ReconciliationReport::from_discrepancies(discrepancies, detected_at)
    }

    /// Depot-origin trips must name a tracked material; no stock may be negative
    pub fn inventory_checks(
        &self,
        snapshot: &ReconciliationSnapshot,
        detected_at: DateTime<Utc>,
    ) -> Vec<Discrepancy> {
        let capabilities = CapabilityTable::empty();
        let catalog = MaterialCatalog::new(&snapshot.stock, &capabilities);
        let mut found = Vec::new();

        for report in snapshot.reports.iter().filter(|r| r.is_trip()) {
            if self.depot.classify(&report.origin) != LocationKind::Depot
                || report.quantity() <= Decimal::ZERO
            {
                continue;
            }
            let Some(material) = report.material() else {
                continue;
            };

            if !catalog.contains(material) {
                found.push(Discrepancy::new(
                    DiscrepancyCheck::UnknownMaterial,
                    vec![report.id.clone()],
                    format!(
                        "Trip {} moves {} of '{}' out of the depot, but that material is not in inventory",
                        report.id,
                        format_quantity(report.quantity()),
                        material
                    ),
                    "Register an entry for the material or correct the report's material description",
                    detected_at,
                ));
            }
        }

        for stock in snapshot
            .stock
            .iter()
            .filter(|s| s.quantity_on_hand < Decimal::ZERO)
        {
            found.push(Discrepancy::new(
                DiscrepancyCheck::NegativeInventory,
                vec![stock.material_name.clone()],
                format!(
                    "Material '{}' has negative quantity on hand ({})",
                    stock.material_name,
                    format_quantity(stock.quantity_on_hand)
                ),
                "Audit the movement journal for this material and post a corrective entry",
                detected_at,
            ));
        }

        found
    }

    /// Valued trips need a sale; automatic sales need a live report
    pub fn sales_checks(
        &self,
        snapshot: &ReconciliationSnapshot,
        detected_at: DateTime<Utc>,
    ) -> Vec<Discrepancy> {
        let referenced: HashSet<String> = snapshot
            .sales
            .iter()
            .filter_map(SaleRecord::referenced_report_id)
            .collect();
        let report_ids: HashSet<&str> = snapshot.reports.iter().map(|r| r.id.as_str()).collect();
        let mut found = Vec::new();

        for report in snapshot.reports.iter().filter(|r| r.is_trip()) {
            if report.value() <= Decimal::ZERO {
                continue;
            }

            let has_sale = referenced.contains(&report.id)
                || snapshot
                    .sales
                    .iter()
                    .any(|sale| Self::matches_by_client_and_day(sale, report));

            if !has_sale {
                found.push(Discrepancy::new(
                    DiscrepancyCheck::MissingAutomaticSale,
                    vec![report.id.clone()],
                    format!(
                        "Trip {} of {} is valued at {} but has no matching sale",
                        report.id,
                        report.report_date,
                        report.value().normalize()
                    ),
                    "Generate the sale for this trip or confirm it was billed elsewhere",
                    detected_at,
                ));
            }
        }

        for sale in snapshot.sales.iter().filter(|s| s.auto_generated) {
            match sale.referenced_report_id() {
                Some(report_id) if report_ids.contains(report_id.as_str()) => {}
                Some(report_id) => found.push(Discrepancy::new(
                    DiscrepancyCheck::OrphanedSale,
                    vec![sale.id.clone(), report_id.clone()],
                    format!(
                        "Automatic sale {} references report {}, which no longer exists",
                        sale.id, report_id
                    ),
                    "Void the sale or restore the originating report",
                    detected_at,
                )),
                None => found.push(Discrepancy::new(
                    DiscrepancyCheck::OrphanedSale,
                    vec![sale.id.clone()],
                    format!(
                        "Automatic sale {} does not reference any report",
                        sale.id
                    ),
                    "Link the sale to its report or mark it as a manual sale",
                    detected_at,
                )),
            }
        }

        found
    }

    /// Manually valued trips and hauling trips without a material
    pub fn report_checks(
        &self,
        snapshot: &ReconciliationSnapshot,
        detected_at: DateTime<Utc>,
    ) -> Vec<Discrepancy> {
        let mut found = Vec::new();

        for report in snapshot.reports.iter().filter(|r| r.is_trip()) {
            if report.value_origin == ValueOrigin::Manual && report.value() > Decimal::ZERO {
                found.push(Discrepancy::new(
                    DiscrepancyCheck::ManualValue,
                    vec![report.id.clone()],
                    format!(
                        "Trip {} was valued manually at {}; no client tariff matched",
                        report.id,
                        report.value().normalize()
                    ),
                    "Create a tariff for this client and route, or confirm the manual price",
                    detected_at,
                ));
            }

            let machine_class = report.machine_class();
            if machine_class.transports_material() && report.material().is_none() {
                found.push(Discrepancy::new(
                    DiscrepancyCheck::MissingMaterial,
                    vec![report.id.clone()],
                    format!(
                        "Trip {} by {} ({}) does not say which material was transported",
                        report.id,
                        report.machine_name.as_deref().unwrap_or("unknown machine"),
                        machine_class
                    ),
                    "Fill in the material description on the report",
                    detected_at,
                ));
            }
        }

        found
    }

    /// Fallback match for sales without a report reference
    fn matches_by_client_and_day(sale: &SaleRecord, report: &Report) -> bool {
        if sale.referenced_report_id().is_some() || sale.sale_date != Some(report.report_date) {
            return false;
        }

        match non_blank(report.client_name.as_deref()) {
            Some(client) => same_name(&sale.client_name, client),
            None => {
                non_blank(Some(&report.destination)).is_some()
                    && same_name(&sale.destination, &report.destination)
            }
        }
    }
}

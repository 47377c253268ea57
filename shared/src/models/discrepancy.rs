//! Reconciliation discrepancy models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record set a discrepancy belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyCategory {
    Inventory,
    Sales,
    Report,
}

/// Severity of a discrepancy, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancySeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for DiscrepancySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscrepancySeverity::Low => write!(f, "Low"),
            DiscrepancySeverity::Medium => write!(f, "Medium"),
            DiscrepancySeverity::High => write!(f, "High"),
        }
    }
}

/// The rule that produced a discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyCheck {
    UnknownMaterial,
    NegativeInventory,
    MissingAutomaticSale,
    OrphanedSale,
    ManualValue,
    MissingMaterial,
}

impl DiscrepancyCheck {
    pub fn code(&self) -> &'static str {
        match self {
            DiscrepancyCheck::UnknownMaterial => "unknown_material",
            DiscrepancyCheck::NegativeInventory => "negative_inventory",
            DiscrepancyCheck::MissingAutomaticSale => "missing_automatic_sale",
            DiscrepancyCheck::OrphanedSale => "orphaned_sale",
            DiscrepancyCheck::ManualValue => "manual_value",
            DiscrepancyCheck::MissingMaterial => "missing_material",
        }
    }

    pub fn category(&self) -> DiscrepancyCategory {
        match self {
            DiscrepancyCheck::UnknownMaterial | DiscrepancyCheck::NegativeInventory => {
                DiscrepancyCategory::Inventory
            }
            DiscrepancyCheck::MissingAutomaticSale | DiscrepancyCheck::OrphanedSale => {
                DiscrepancyCategory::Sales
            }
            DiscrepancyCheck::ManualValue | DiscrepancyCheck::MissingMaterial => {
                DiscrepancyCategory::Report
            }
        }
    }

    pub fn severity(&self) -> DiscrepancySeverity {
        match self {
            DiscrepancyCheck::UnknownMaterial | DiscrepancyCheck::NegativeInventory => {
                DiscrepancySeverity::High
            }
            DiscrepancyCheck::MissingAutomaticSale | DiscrepancyCheck::MissingMaterial => {
                DiscrepancySeverity::Medium
            }
            DiscrepancyCheck::OrphanedSale | DiscrepancyCheck::ManualValue => {
                DiscrepancySeverity::Low
            }
        }
    }
}

/// A detected inconsistency for operator review. Not persisted by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discrepancy {
    /// Stable across runs: `<check code>:<affected ids>`
    pub id: String,
    pub category: DiscrepancyCategory,
    pub severity: DiscrepancySeverity,
    pub check: DiscrepancyCheck,
    pub description: String,
    pub affected_record_ids: Vec<String>,
    pub suggested_action: String,
    pub detected_at: DateTime<Utc>,
}

impl Discrepancy {
    pub fn new(
        check: DiscrepancyCheck,
        affected_record_ids: Vec<String>,
        description: String,
        suggested_action: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{}:{}", check.code(), affected_record_ids.join(",")),
            category: check.category(),
            severity: check.severity(),
            check,
            description,
            affected_record_ids,
            suggested_action: suggested_action.into(),
            detected_at,
        }
    }
}

/// Discrepancies grouped by category, each in detection order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscrepanciesByCategory {
    pub inventory: Vec<Discrepancy>,
    pub sales: Vec<Discrepancy>,
    pub report: Vec<Discrepancy>,
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationReport {
    pub total_discrepancies: usize,
    pub by_category: DiscrepanciesByCategory,
    pub computed_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn from_discrepancies(discrepancies: Vec<Discrepancy>, computed_at: DateTime<Utc>) -> Self {
        let total_discrepancies = discrepancies.len();
        let mut by_category = DiscrepanciesByCategory::default();

        for discrepancy in discrepancies {
            match discrepancy.category {
                DiscrepancyCategory::Inventory => by_category.inventory.push(discrepancy),
                DiscrepancyCategory::Sales => by_category.sales.push(discrepancy),
                DiscrepancyCategory::Report => by_category.report.push(discrepancy),
            }
        }

        Self {
            total_discrepancies,
            by_category,
            computed_at,
        }
    }

    /// All discrepancies in category order (inventory, sales, report)
    pub fn all(&self) -> impl Iterator<Item = &Discrepancy> {
        self.by_category
            .inventory
            .iter()
            .chain(self.by_category.sales.iter())
            .chain(self.by_category.report.iter())
    }

    /// Highest severity first; detection order kept within a severity
    pub fn prioritized(&self) -> Vec<&Discrepancy> {
        let mut items: Vec<&Discrepancy> = self.all().collect();
        items.sort_by(|a, b| b.severity.cmp(&a.severity));
        items
    }

    pub fn count_by_severity(&self, severity: DiscrepancySeverity) -> usize {
        self.all().filter(|d| d.severity == severity).count()
    }

    pub fn is_clean(&self) -> bool {
        self.total_discrepancies == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discrepancy(check: DiscrepancyCheck, id: &str) -> Discrepancy {
        Discrepancy::new(
            check,
            vec![id.to_string()],
            "test".to_string(),
            "review",
            Utc::now(),
        )
    }

    #[test]
    fn test_severity_ordering() {
        assert!(DiscrepancySeverity::Low < DiscrepancySeverity::Medium);
        assert!(DiscrepancySeverity::Medium < DiscrepancySeverity::High);
    }

    #[test]
    fn test_id_is_derived_from_check_and_records() {
        let d = Discrepancy::new(
            DiscrepancyCheck::OrphanedSale,
            vec!["s-1".to_string(), "r-9".to_string()],
            "x".to_string(),
            "y",
            Utc::now(),
        );
        assert_eq!(d.id, "orphaned_sale:s-1,r-9");
        assert_eq!(d.category, DiscrepancyCategory::Sales);
        assert_eq!(d.severity, DiscrepancySeverity::Low);
    }

    #[test]
    fn test_prioritized_is_stable_within_severity() {
        let report = ReconciliationReport::from_discrepancies(
            vec![
                discrepancy(DiscrepancyCheck::ManualValue, "a"),
                discrepancy(DiscrepancyCheck::UnknownMaterial, "b"),
                discrepancy(DiscrepancyCheck::MissingAutomaticSale, "c"),
                discrepancy(DiscrepancyCheck::UnknownMaterial, "d"),
            ],
            Utc::now(),
        );

        let order: Vec<&str> = report
            .prioritized()
            .iter()
            .map(|d| d.affected_record_ids[0].as_str())
            .collect();
        assert_eq!(order, vec!["b", "d", "c", "a"]);
        assert_eq!(report.total_discrepancies, 4);
        assert_eq!(report.count_by_severity(DiscrepancySeverity::High), 2);
    }
}

//! Operational reports produced by the reporting subsystem

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MachineClass;
use crate::types::non_blank;

/// Kind of operational report. Only trips matter to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportKind {
    Trip,
    Other(String),
}

impl From<String> for ReportKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "trip" | "viaje" => ReportKind::Trip,
            _ => ReportKind::Other(value),
        }
    }
}

impl From<ReportKind> for String {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Trip => "Trip".to_string(),
            ReportKind::Other(other) => other,
        }
    }
}

/// Where a report's computed value came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// Priced from the client's tariff
    #[default]
    Tariff,
    /// Typed in by the operator because no tariff matched
    Manual,
}

/// A vehicle/equipment report. Consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: String,
    pub report_kind: ReportKind,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub material_description: Option<String>,
    #[serde(default)]
    pub quantity_cubic_meters: Option<Decimal>,
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub machine_name: Option<String>,
    /// Explicit equipment type, when the producer knows it
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    pub report_date: NaiveDate,
    #[serde(default)]
    pub computed_value: Option<Decimal>,
    #[serde(default)]
    pub value_origin: ValueOrigin,
}

impl Report {
    pub fn is_trip(&self) -> bool {
        self.report_kind == ReportKind::Trip
    }

    /// Transported volume, zero when absent
    pub fn quantity(&self) -> Decimal {
        self.quantity_cubic_meters.unwrap_or(Decimal::ZERO)
    }

    /// Computed value, zero when absent
    pub fn value(&self) -> Decimal {
        self.computed_value.unwrap_or(Decimal::ZERO)
    }

    /// Material description, if not blank
    pub fn material(&self) -> Option<&str> {
        non_blank(self.material_description.as_deref())
    }

    pub fn machine_class(&self) -> MachineClass {
        MachineClass::resolve(self.machine_type.as_deref(), self.machine_name.as_deref())
    }
}

//! Sales records produced by the sales subsystem

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::non_blank;

/// Markers that embed a report reference in free-form sale notes
const REPORT_REFERENCE_MARKERS: [&str; 2] = ["reporte:", "report:"];

/// A sale. Consumed read-only by reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub destination: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
    /// Created automatically from a trip report rather than by hand
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default)]
    pub source_report_id: Option<String>,
}

impl SaleRecord {
    /// Report this sale was generated from: the explicit field, else a
    /// `report:<id>` token in the notes
    pub fn referenced_report_id(&self) -> Option<String> {
        non_blank(self.source_report_id.as_deref())
            .map(str::to_string)
            .or_else(|| extract_report_reference(&self.notes))
    }
}

/// Note fragment that links a sale back to its report
pub fn report_reference(report_id: &str) -> String {
    format!("report:{}", report_id)
}

/// Find a `report:<id>` (or `reporte:<id>`) token in free text
pub fn extract_report_reference(notes: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lowered = notes.to_ascii_lowercase();

    let start = REPORT_REFERENCE_MARKERS
        .iter()
        .filter_map(|marker| lowered.find(marker).map(|pos| pos + marker.len()))
        .min()?;

    let id: String = notes[start..]
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace() && !matches!(c, ',' | ';' | ')' | ']'))
        .collect();

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

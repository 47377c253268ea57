//! Trip report classification
//!
//! Decides whether a trip moves material into the depot, out of it, or does
//! not touch inventory at all. Only loader-class machines may draw down stock;
//! trips by other machines leaving the depot are rejected, not applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DepotMatcher, LocationKind, MachineClass, MovementKind, Report, ReportKind};

/// How a report affects inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "classification", rename_all = "snake_case")]
pub enum TripClassification {
    /// Material delivered to the depot from `origin`
    Entry {
        material_name: String,
        quantity: Decimal,
        origin: String,
    },
    /// Material taken from the depot to `destination` by a loader
    Exit {
        material_name: String,
        quantity: Decimal,
        destination: String,
    },
    /// Leaves the depot, but the machine may not draw down stock
    RejectedExit {
        machine_class: MachineClass,
        reason: String,
    },
    NotApplicable {
        reason: String,
    },
}

impl TripClassification {
    pub fn kind(&self) -> Option<MovementKind> {
        match self {
            TripClassification::Entry { .. } => Some(MovementKind::Entry),
            TripClassification::Exit { .. } => Some(MovementKind::Exit),
            _ => None,
        }
    }
}

/// Classify a report against the depot.
///
/// `unspecified_material` names the material when the report has no
/// description.
pub fn classify_trip(
    report: &Report,
    depot: &DepotMatcher,
    unspecified_material: &str,
) -> TripClassification {
    if let ReportKind::Other(kind) = &report.report_kind {
        return TripClassification::NotApplicable {
            reason: format!("report kind '{}' does not affect inventory", kind),
        };
    }

    let quantity = report.quantity();
    if quantity <= Decimal::ZERO {
        return TripClassification::NotApplicable {
            reason: "trip carries no material quantity".to_string(),
        };
    }

    let origin = depot.classify(&report.origin);
    let destination = depot.classify(&report.destination);
    let material_name = report
        .material()
        .unwrap_or(unspecified_material)
        .to_string();

    match (origin, destination) {
        (LocationKind::External, LocationKind::Depot) => TripClassification::Entry {
            material_name,
            quantity,
            origin: report.origin.trim().to_string(),
        },
        (LocationKind::Depot, LocationKind::External) => {
            let machine_class = report.machine_class();
            if machine_class.is_loader() {
                TripClassification::Exit {
                    material_name,
                    quantity,
                    destination: report.destination.trim().to_string(),
                }
            } else {
                TripClassification::RejectedExit {
                    machine_class,
                    reason: format!(
                        "machine '{}' is not loader-class; only loaders draw down depot stock",
                        report.machine_name.as_deref().unwrap_or("unknown")
                    ),
                }
            }
        }
        (LocationKind::Depot, LocationKind::Depot) => TripClassification::NotApplicable {
            reason: "trip stays within the depot".to_string(),
        },
        (LocationKind::External, LocationKind::External) => TripClassification::NotApplicable {
            reason: "trip does not touch the depot".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNSPECIFIED_MATERIAL;
    use chrono::NaiveDate;

    fn trip(origin: &str, destination: &str, machine: &str) -> Report {
        Report {
            id: "rep-1".to_string(),
            report_kind: ReportKind::Trip,
            origin: origin.to_string(),
            destination: destination.to_string(),
            material_description: Some("Arena".to_string()),
            quantity_cubic_meters: Some(Decimal::from(14)),
            machine_id: Some("m-1".to_string()),
            machine_name: Some(machine.to_string()),
            machine_type: None,
            user_name: Some("operador".to_string()),
            client_name: None,
            report_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            computed_value: None,
            value_origin: Default::default(),
        }
    }

    fn classify(report: &Report) -> TripClassification {
        classify_trip(report, &DepotMatcher::default(), UNSPECIFIED_MATERIAL)
    }

    #[test]
    fn test_delivery_to_depot_is_entry() {
        let result = classify(&trip("Cantera Sur", "Acopio Maquipaes", "Volqueta 12"));
        assert_eq!(
            result,
            TripClassification::Entry {
                material_name: "Arena".to_string(),
                quantity: Decimal::from(14),
                origin: "Cantera Sur".to_string(),
            }
        );
    }

    #[test]
    fn test_loader_leaving_depot_is_exit() {
        let result = classify(&trip("Acopio Maquipaes", "Cliente X", "Cargador 950"));
        assert_eq!(result.kind(), Some(MovementKind::Exit));
    }

    #[test]
    fn test_truck_leaving_depot_is_rejected() {
        let result = classify(&trip("Acopio Maquipaes", "Cliente Y", "Volqueta 12"));
        match result {
            TripClassification::RejectedExit { machine_class, reason } => {
                assert_eq!(machine_class, MachineClass::DumpTruck);
                assert!(reason.contains("Volqueta 12"));
            }
            other => panic!("expected rejected exit, got {:?}", other),
        }
    }

    #[test]
    fn test_depot_to_depot_is_not_applicable() {
        let result = classify(&trip("Acopio Maquipaes", "acopio maquipaes", "Cargador"));
        assert!(matches!(result, TripClassification::NotApplicable { .. }));
    }

    #[test]
    fn test_external_trip_is_not_applicable() {
        let result = classify(&trip("Cantera Sur", "Cliente X", "Volqueta 1"));
        assert!(matches!(result, TripClassification::NotApplicable { .. }));
    }

    #[test]
    fn test_blank_material_falls_back() {
        let mut report = trip("Cantera Sur", "Acopio Maquipaes", "Volqueta 1");
        report.material_description = Some(" ".to_string());
        match classify(&report) {
            TripClassification::Entry { material_name, .. } => {
                assert_eq!(material_name, UNSPECIFIED_MATERIAL)
            }
            other => panic!("expected entry, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_quantity_and_other_kinds_ignored() {
        let mut report = trip("Cantera Sur", "Acopio Maquipaes", "Volqueta 1");
        report.quantity_cubic_meters = Some(Decimal::ZERO);
        assert!(matches!(classify(&report), TripClassification::NotApplicable { .. }));

        let mut report = trip("Cantera Sur", "Acopio Maquipaes", "Volqueta 1");
        report.report_kind = ReportKind::Other("Hours".to_string());
        assert!(matches!(classify(&report), TripClassification::NotApplicable { .. }));
    }

    #[test]
    fn test_explicit_loader_type_allows_exit() {
        let mut report = trip("Acopio Maquipaes", "Obra 3", "Equipo 7");
        report.machine_type = Some("cargador".to_string());
        assert_eq!(classify(&report).kind(), Some(MovementKind::Exit));
    }
}

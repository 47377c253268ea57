//! Machine classes and stock movement capabilities

use serde::{Deserialize, Serialize};

use crate::types::normalize_key;

/// Which stock operations a machine type may perform at the depot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MachineCapability {
    pub can_enter: bool,
    pub can_exit: bool,
}

impl MachineCapability {
    /// Applied to untyped operations and unknown machine types
    pub const UNRESTRICTED: MachineCapability = MachineCapability {
        can_enter: true,
        can_exit: true,
    };

    pub const fn new(can_enter: bool, can_exit: bool) -> Self {
        Self {
            can_enter,
            can_exit,
        }
    }
}

impl Default for MachineCapability {
    fn default() -> Self {
        Self::UNRESTRICTED
    }
}

/// Equipment class resolved once at the boundary from a machine type or name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MachineClass {
    /// Front loader; the only class allowed to draw down depot stock
    Loader,
    DumpTruck,
    TractorTrailer,
    Excavator,
    Other,
}

impl MachineClass {
    /// Resolve from an explicit equipment type such as `"volqueta"` or `"Dump Truck"`
    pub fn from_type(machine_type: &str) -> Option<Self> {
        match normalize_key(machine_type).as_str() {
            "loader" | "wheel_loader" | "front_loader" | "cargador" | "cargador_frontal" => {
                Some(MachineClass::Loader)
            }
            "dump_truck" | "truck" | "volqueta" | "volqueta_doble_troque" => {
                Some(MachineClass::DumpTruck)
            }
            "tractor_trailer" | "semi_trailer" | "tractomula" => Some(MachineClass::TractorTrailer),
            "excavator" | "excavadora" | "retroexcavadora" | "backhoe" => {
                Some(MachineClass::Excavator)
            }
            _ => None,
        }
    }

    /// Heuristic over a free-form machine name, e.g. `"Cargador CAT 950"`
    pub fn from_name(machine_name: &str) -> Self {
        let name = machine_name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

        if has(&["loader", "cargador"]) {
            MachineClass::Loader
        } else if has(&["volqueta", "dump"]) {
            MachineClass::DumpTruck
        } else if has(&["tractomula", "trailer"]) {
            MachineClass::TractorTrailer
        } else if has(&["excavador", "excavator", "backhoe"]) {
            MachineClass::Excavator
        } else {
            MachineClass::Other
        }
    }

    /// An explicit known type wins; otherwise the name heuristic decides
    pub fn resolve(machine_type: Option<&str>, machine_name: Option<&str>) -> Self {
        machine_type
            .and_then(Self::from_type)
            .or_else(|| machine_name.map(Self::from_name))
            .unwrap_or(MachineClass::Other)
    }

    pub fn is_loader(&self) -> bool {
        matches!(self, MachineClass::Loader)
    }

    /// Classes whose trips are expected to carry a material
    pub fn transports_material(&self) -> bool {
        matches!(
            self,
            MachineClass::Loader | MachineClass::DumpTruck | MachineClass::TractorTrailer
        )
    }

    /// Key of this class in the capability table
    pub fn capability_key(&self) -> &'static str {
        match self {
            MachineClass::Loader => "loader",
            MachineClass::DumpTruck => "dump_truck",
            MachineClass::TractorTrailer => "tractor_trailer",
            MachineClass::Excavator => "excavator",
            MachineClass::Other => "other",
        }
    }
}

impl std::fmt::Display for MachineClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineClass::Loader => write!(f, "Loader"),
            MachineClass::DumpTruck => write!(f, "Dump Truck"),
            MachineClass::TractorTrailer => write!(f, "Tractor Trailer"),
            MachineClass::Excavator => write!(f, "Excavator"),
            MachineClass::Other => write!(f, "Other"),
        }
    }
}

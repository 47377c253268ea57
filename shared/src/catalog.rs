//! Material catalog and machine capability table
//!
//! Read-only views used by validation: which materials are tracked, and which
//! machine types may add or remove stock.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MachineCapability, MachineClass, MaterialStock};
use crate::types::{normalize_key, same_name};

/// Machine type → capability. Keys are normalized with [`normalize_key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityTable {
    entries: BTreeMap<String, MachineCapability>,
}

impl CapabilityTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Depot rules: loaders may move stock both ways, haulers only deliver,
    /// excavators never touch the ledger.
    pub fn standard() -> Self {
        let loader = MachineCapability::new(true, true);
        let hauler = MachineCapability::new(true, false);
        let excavator = MachineCapability::new(false, false);

        Self::empty()
            .with("loader", loader)
            .with("cargador", loader)
            .with("dump_truck", hauler)
            .with("volqueta", hauler)
            .with("tractor_trailer", hauler)
            .with("tractomula", hauler)
            .with("excavator", excavator)
            .with("excavadora", excavator)
    }

    pub fn with(mut self, machine_type: &str, capability: MachineCapability) -> Self {
        self.insert(machine_type, capability);
        self
    }

    pub fn insert(&mut self, machine_type: &str, capability: MachineCapability) {
        self.entries.insert(normalize_key(machine_type), capability);
    }

    /// Capability of a known machine type.
    ///
    /// Falls back to the entry of the type's [`MachineClass`] so that aliases
    /// such as `"wheel loader"` resolve to `"loader"`.
    pub fn lookup(&self, machine_type: &str) -> Option<MachineCapability> {
        let key = normalize_key(machine_type);
        if key.is_empty() {
            return None;
        }

        self.entries.get(&key).copied().or_else(|| {
            MachineClass::from_type(&key)
                .and_then(|class| self.entries.get(class.capability_key()).copied())
        })
    }

    /// Unknown or absent machine types are unrestricted
    pub fn capability_for(&self, machine_type: Option<&str>) -> MachineCapability {
        machine_type
            .and_then(|t| self.lookup(t))
            .unwrap_or(MachineCapability::UNRESTRICTED)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Point-in-time view over tracked materials and the capability table
#[derive(Debug, Clone, Copy)]
pub struct MaterialCatalog<'a> {
    stock: &'a [MaterialStock],
    capabilities: &'a CapabilityTable,
}

impl<'a> MaterialCatalog<'a> {
    pub fn new(stock: &'a [MaterialStock], capabilities: &'a CapabilityTable) -> Self {
        Self {
            stock,
            capabilities,
        }
    }

    /// Distinct tracked material names, sorted
    pub fn material_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.stock.len());
        for stock in self.stock {
            if !names.iter().any(|n| same_name(n, &stock.material_name)) {
                names.push(stock.material_name.clone());
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    /// Case-insensitive lookup of a tracked material
    pub fn find(&self, material_name: &str) -> Option<&'a MaterialStock> {
        self.stock
            .iter()
            .find(|s| same_name(&s.material_name, material_name))
    }

    pub fn contains(&self, material_name: &str) -> bool {
        self.find(material_name).is_some()
    }

    pub fn quantity_on_hand(&self, material_name: &str) -> Option<Decimal> {
        self.find(material_name).map(|s| s.quantity_on_hand)
    }

    pub fn capability(&self, machine_type: Option<&str>) -> MachineCapability {
        self.capabilities.capability_for(machine_type)
    }

    pub fn is_known_machine_type(&self, machine_type: &str) -> bool {
        self.capabilities.lookup(machine_type).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock(name: &str, qty: i64) -> MaterialStock {
        MaterialStock {
            material_name: name.to_string(),
            quantity_on_hand: Decimal::from(qty),
            average_unit_cost: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_standard_table() {
        let table = CapabilityTable::standard();
        assert_eq!(table.lookup("Volqueta"), Some(MachineCapability::new(true, false)));
        assert_eq!(table.lookup("CARGADOR"), Some(MachineCapability::new(true, true)));
        assert_eq!(table.lookup("Dump Truck"), Some(MachineCapability::new(true, false)));
        assert_eq!(table.lookup("grua"), None);
    }

    #[test]
    fn test_aliases_resolve_through_machine_class() {
        let table = CapabilityTable::standard();
        assert_eq!(table.lookup("wheel loader"), Some(MachineCapability::new(true, true)));
        assert_eq!(table.lookup("retroexcavadora"), Some(MachineCapability::new(false, false)));
    }

    #[test]
    fn test_unknown_and_absent_types_unrestricted() {
        let table = CapabilityTable::standard();
        assert_eq!(table.capability_for(None), MachineCapability::UNRESTRICTED);
        assert_eq!(table.capability_for(Some("grua")), MachineCapability::UNRESTRICTED);
        assert_eq!(table.capability_for(Some("  ")), MachineCapability::UNRESTRICTED);
    }

    #[test]
    fn test_catalog_names_sorted_and_distinct() {
        let stock = vec![stock("Grava", 3), stock("arena", 0), stock("Arena", 5)];
        let table = CapabilityTable::standard();
        let catalog = MaterialCatalog::new(&stock, &table);

        assert_eq!(catalog.material_names(), vec!["arena", "Grava"]);
        assert!(catalog.contains("GRAVA"));
        assert_eq!(catalog.quantity_on_hand("Grava"), Some(Decimal::from(3)));
        assert_eq!(catalog.quantity_on_hand("Recebo"), None);
    }
}

//! Stock ledger tests
//!
//! Tests for the ledger and its journal including:
//! - Entries create and grow tracked materials
//! - Exits by loaders draw down stock, never below zero
//! - Rejected operations leave stock and journal untouched
//! - Property: quantity on hand equals journaled entries minus exits
//! - Property: every journaled movement chains onto the previous one

use std::str::FromStr;
use std::sync::Arc;

use acopio_stock::error::AppError;
use acopio_stock::services::{verify_movement_chain, StockLedger};
use acopio_stock::storage::{CollectionStore, InMemoryStore};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::collections::{INVENTORY, INVENTORY_MOVEMENTS};
use shared::{CapabilityTable, MovementContext, MovementKind, ValidationRule};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ledger_over(store: Arc<InMemoryStore>) -> StockLedger {
    StockLedger::with_capabilities(store, CapabilityTable::standard())
}

fn loader() -> MovementContext {
    MovementContext {
        actor_machine_name: Some("Cargador 3".to_string()),
        machine_type: Some("loader".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Entry into an empty ledger starts the material at zero
    #[tokio::test]
    async fn test_first_entry_tracks_material() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store.clone());

        let result = ledger
            .apply_entry("Arena", dec("50"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.message.contains("Arena"));
        assert!(result.message.contains("50 m³"));
        assert!(result.movement_id.is_some());

        let arena = ledger.stock_for("Arena").await.unwrap().unwrap();
        assert_eq!(arena.quantity_on_hand, dec("50"));

        let movements = ledger.journal().list().await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Entry);
        assert_eq!(movements[0].quantity_before, Decimal::ZERO);
        assert_eq!(movements[0].quantity_after, dec("50"));
        assert_eq!(movements[0].counterparty_location, "Cantera Sur");
        assert_eq!(Some(movements[0].id), result.movement_id);
    }

    /// Loader exit after an entry draws stock down
    #[tokio::test]
    async fn test_loader_exit_draws_down() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        ledger
            .apply_entry("Arena", dec("50"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        let result = ledger
            .apply_exit("Arena", dec("20"), "Cliente X", loader())
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.message.contains("Cliente X"));
        let snapshot = result.updated_stock.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].quantity_on_hand, dec("30"));

        let movements = ledger.journal().list().await.unwrap();
        assert_eq!(movements[1].quantity_before, dec("50"));
        assert_eq!(movements[1].quantity_after, dec("30"));
        assert_eq!(movements[1].actor_machine_name.as_deref(), Some("Cargador 3"));
    }

    /// Exit beyond stock fails and changes nothing
    #[tokio::test]
    async fn test_insufficient_stock_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store.clone());

        ledger
            .apply_entry("Arena", dec("30"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        let stock_before = store.load_collection(INVENTORY).await.unwrap();
        let journal_before = store.load_collection(INVENTORY_MOVEMENTS).await.unwrap();

        let result = ledger
            .apply_exit("Arena", dec("40"), "Cliente X", loader())
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.message.contains("insufficient stock, available: 30"));
        assert_eq!(result.rule, Some(ValidationRule::InsufficientStock));
        assert!(result.movement_id.is_none());
        assert!(result.updated_stock.is_none());

        assert_eq!(store.load_collection(INVENTORY).await.unwrap(), stock_before);
        assert_eq!(
            store.load_collection(INVENTORY_MOVEMENTS).await.unwrap(),
            journal_before
        );
    }

    /// Exit of a material never received is rejected
    #[tokio::test]
    async fn test_exit_of_unknown_material_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        let result = ledger
            .apply_exit("Gravilla", dec("5"), "Obra Norte", loader())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.rule, Some(ValidationRule::UnknownMaterial));
        assert!(ledger.stock().await.unwrap().is_empty());
        assert!(ledger.journal().list().await.unwrap().is_empty());
    }

    /// Dump trucks deliver but may not draw down
    #[tokio::test]
    async fn test_capability_table_blocks_truck_exit() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        let truck = MovementContext {
            machine_type: Some("volqueta".to_string()),
            ..Default::default()
        };

        let entry = ledger
            .apply_entry("Base", dec("12"), "Cantera Sur", truck.clone())
            .await
            .unwrap();
        assert!(entry.success);

        let exit = ledger
            .apply_exit("Base", dec("4"), "Obra Norte", truck)
            .await
            .unwrap();
        assert!(!exit.success);
        assert_eq!(exit.rule, Some(ValidationRule::ExitNotPermitted));
        assert_eq!(
            ledger.stock_for("base").await.unwrap().unwrap().quantity_on_hand,
            dec("12")
        );
    }

    /// Names match case-insensitively and keep their first spelling
    #[tokio::test]
    async fn test_material_names_case_insensitive() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        ledger
            .apply_entry("  ARENA ", dec("5"), "Cantera Norte", MovementContext::default())
            .await
            .unwrap();

        let stock = ledger.stock().await.unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].material_name, "Arena");
        assert_eq!(stock[0].quantity_on_hand, dec("15"));
        assert_eq!(
            ledger.catalog().material_names().await.unwrap(),
            vec!["Arena".to_string()]
        );
    }

    /// Non-positive quantities never reach storage
    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        for quantity in [Decimal::ZERO, dec("-3")] {
            let result = ledger
                .apply_entry("Arena", quantity, "Cantera Sur", MovementContext::default())
                .await
                .unwrap();
            assert!(!result.success);
            assert_eq!(result.rule, Some(ValidationRule::NonPositiveQuantity));
        }
        assert!(ledger.stock().await.unwrap().is_empty());
    }

    /// Weighted average cost lies between the two purchase prices
    #[tokio::test]
    async fn test_weighted_average_cost() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        let priced = |cost: &str| MovementContext {
            unit_cost: Some(dec(cost)),
            ..Default::default()
        };

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", priced("20000"))
            .await
            .unwrap();
        ledger
            .apply_entry("Arena", dec("30"), "Cantera Norte", priced("24000"))
            .await
            .unwrap();

        let arena = ledger.stock_for("Arena").await.unwrap().unwrap();
        let average = arena.average_unit_cost.unwrap();
        assert!(average > dec("20000") && average < dec("24000"));
        assert_eq!(average, dec("23000"));

        let valuation = ledger.valuation().await.unwrap();
        assert_eq!(valuation.total_quantity, dec("40"));
        assert_eq!(valuation.total_value, dec("920000"));
    }

    /// An entry past the largest representable stock is rejected, not applied
    #[tokio::test]
    async fn test_entry_past_representable_stock_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        let first = ledger
            .apply_entry("Arena", Decimal::MAX, "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        assert!(first.success);

        let result = ledger
            .apply_entry("Arena", Decimal::ONE, "Cantera Sur", MovementContext::default())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.rule, Some(ValidationRule::QuantityOverflow));
        assert_eq!(ledger.journal().list().await.unwrap().len(), 1);
        assert_eq!(
            ledger.stock_for("Arena").await.unwrap().unwrap().quantity_on_hand,
            Decimal::MAX
        );

        let valuation = ledger.valuation().await.unwrap();
        assert_eq!(valuation.total_quantity, Decimal::MAX);
    }

    /// Costs that are not positive or that overflow the average are rejected
    #[tokio::test]
    async fn test_bad_unit_cost_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        let priced = |cost: Decimal| MovementContext {
            unit_cost: Some(cost),
            ..Default::default()
        };

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", priced(dec("20000")))
            .await
            .unwrap();

        for cost in [Decimal::ZERO, dec("-5")] {
            let result = ledger
                .apply_entry("Arena", dec("5"), "Cantera Sur", priced(cost))
                .await
                .unwrap();
            assert!(!result.success);
            assert_eq!(result.rule, Some(ValidationRule::NonPositiveUnitCost));
        }

        let result = ledger
            .apply_entry("Arena", dec("1"), "Cantera Sur", priced(Decimal::MAX))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.rule, Some(ValidationRule::QuantityOverflow));

        let arena = ledger.stock_for("Arena").await.unwrap().unwrap();
        assert_eq!(arena.quantity_on_hand, dec("10"));
        assert_eq!(arena.average_unit_cost, Some(dec("20000")));
        assert_eq!(ledger.journal().list().await.unwrap().len(), 1);
    }

    /// Journal filters per material and verifies clean
    #[tokio::test]
    async fn test_journal_per_material_and_chain() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        ledger
            .apply_entry("Triturado", dec("8"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        ledger
            .apply_exit("arena", dec("4"), "Obra Norte", loader())
            .await
            .unwrap();

        let arena = ledger.journal().list_for_material("ARENA").await.unwrap();
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[1].quantity_before, dec("10"));
        assert!(ledger.journal().verify_chain().await.unwrap().is_empty());
    }

    /// Appends keep insertion order and report back-references
    #[tokio::test]
    async fn test_journal_append_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store);

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        let mut imported = ledger.journal().list().await.unwrap()[0].clone();
        imported.id = uuid::Uuid::new_v4();
        imported.source_report_id = Some("r-77".to_string());
        imported.quantity_before = dec("10");
        imported.quantity_after = dec("20");
        ledger.journal().append(&imported).await.unwrap();

        let movements = ledger.journal().list().await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[1].id, imported.id);
        assert!(ledger.journal().contains_report("r-77").await.unwrap());
        assert!(!ledger.journal().contains_report("r-78").await.unwrap());
        assert!(ledger.journal().verify_chain().await.unwrap().is_empty());
    }

    /// A failed stock write leaves the journal as it was
    #[tokio::test]
    async fn test_failed_stock_write_keeps_journal() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(store.clone());

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();
        store.fail_writes_to(INVENTORY).await;

        let result = ledger
            .apply_entry("Arena", dec("5"), "Cantera Sur", MovementContext::default())
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(ledger.journal().list().await.unwrap().len(), 1);
        assert_eq!(
            ledger.stock_for("Arena").await.unwrap().unwrap().quantity_on_hand,
            dec("10")
        );
    }

    /// Concurrent exits never oversell
    #[tokio::test]
    async fn test_concurrent_exits_serialized() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(ledger_over(store));

        ledger
            .apply_entry("Arena", dec("10"), "Cantera Sur", MovementContext::default())
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .apply_exit("Arena", dec("3"), "Obra Norte", loader())
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().success {
                applied += 1;
            }
        }

        assert_eq!(applied, 3);
        assert_eq!(
            ledger.stock_for("Arena").await.unwrap().unwrap().quantity_on_hand,
            dec("1")
        );
        assert!(ledger.journal().verify_chain().await.unwrap().is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500i64, 0u32..=2u32).prop_map(|(units, scale)| Decimal::new(units, scale))
    }

    fn operation_strategy() -> impl Strategy<Value = (bool, Decimal)> {
        (any::<bool>(), quantity_strategy())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Quantity on hand never goes negative and equals entries minus exits
        #[test]
        fn prop_stock_conserved_and_non_negative(
            operations in prop::collection::vec(operation_strategy(), 1..25)
        ) {
            let (on_hand, movements) = tokio_test::block_on(async {
                let store = Arc::new(InMemoryStore::new());
                let ledger = ledger_over(store);

                for (is_entry, quantity) in &operations {
                    let result = if *is_entry {
                        ledger.apply_entry("Arena", *quantity, "Cantera Sur", MovementContext::default()).await
                    } else {
                        ledger.apply_exit("Arena", *quantity, "Obra Norte", loader()).await
                    };
                    result.unwrap();
                }

                let on_hand = ledger
                    .stock_for("Arena")
                    .await
                    .unwrap()
                    .map(|s| s.quantity_on_hand)
                    .unwrap_or(Decimal::ZERO);
                (on_hand, ledger.journal().list().await.unwrap())
            });

            prop_assert!(on_hand >= Decimal::ZERO);

            let journaled: Decimal = movements
                .iter()
                .map(|m| match m.kind {
                    MovementKind::Entry => m.quantity,
                    MovementKind::Exit => -m.quantity,
                })
                .sum();
            prop_assert_eq!(on_hand, journaled);
            prop_assert!(verify_movement_chain(&movements).is_empty());
        }

        /// A rejected exit leaves stock and journal exactly as they were
        #[test]
        fn prop_rejection_has_no_side_effect(
            stocked in quantity_strategy(),
            excess in quantity_strategy()
        ) {
            let (before, after, result) = tokio_test::block_on(async {
                let store = Arc::new(InMemoryStore::new());
                let ledger = ledger_over(store.clone());
                ledger
                    .apply_entry("Arena", stocked, "Cantera Sur", MovementContext::default())
                    .await
                    .unwrap();

                let before = (
                    store.load_collection(INVENTORY).await.unwrap(),
                    store.load_collection(INVENTORY_MOVEMENTS).await.unwrap(),
                );
                let result = ledger
                    .apply_exit("Arena", stocked + excess, "Obra Norte", loader())
                    .await
                    .unwrap();
                let after = (
                    store.load_collection(INVENTORY).await.unwrap(),
                    store.load_collection(INVENTORY_MOVEMENTS).await.unwrap(),
                );
                (before, after, result)
            });

            prop_assert!(!result.success);
            prop_assert_eq!(before, after);
        }
    }
}

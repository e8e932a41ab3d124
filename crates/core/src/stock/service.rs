//! Warehouse stock ledger.
//!
//! Holds per-product, per-zone quantities and the append-only movement
//! log. Every check happens before any state change (check-then-act), so
//! a failed call leaves both the levels and the log untouched.

use std::collections::BTreeMap;

use sauda_shared::types::{MovementId, ProductId, TenantId};
use serde::{Deserialize, Serialize};

use super::error::StockError;
use super::types::{MovementDetail, MovementKind, MovementMeta, StockAge, StockMovement, Zone};

/// Per-product, per-zone stock levels plus the movement audit log for one
/// tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLedger {
    tenant_id: TenantId,
    levels: BTreeMap<ProductId, BTreeMap<Zone, i64>>,
    movements: Vec<StockMovement>,
}

impl StockLedger {
    /// Creates an empty stock ledger for a tenant.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            levels: BTreeMap::new(),
            movements: Vec::new(),
        }
    }

    /// The tenant this stock ledger belongs to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    // ========== Reads ==========

    /// Units of a product currently in a zone.
    #[must_use]
    pub fn on_hand(&self, product_id: ProductId, zone: Zone) -> i64 {
        self.levels
            .get(&product_id)
            .and_then(|zones| zones.get(&zone))
            .copied()
            .unwrap_or(0)
    }

    /// Per-zone quantities of a product (operable zones only; absent
    /// zones hold zero).
    #[must_use]
    pub fn quantities(&self, product_id: ProductId) -> BTreeMap<Zone, i64> {
        Zone::OPERABLE
            .into_iter()
            .map(|zone| (zone, self.on_hand(product_id, zone)))
            .collect()
    }

    /// Total operable stock of a product across all zones.
    ///
    /// Archived (migrated-history) stock is excluded.
    #[must_use]
    pub fn total(&self, product_id: ProductId) -> i64 {
        Zone::OPERABLE
            .into_iter()
            .map(|zone| self.on_hand(product_id, zone))
            .sum()
    }

    /// Sellable stock: total minus Booked minus Repair.
    #[must_use]
    pub fn sellable(&self, product_id: ProductId) -> i64 {
        self.total(product_id)
            - self.on_hand(product_id, Zone::Booked)
            - self.on_hand(product_id, Zone::Repair)
    }

    /// Products that have ever held stock, ordered by id.
    pub fn products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.levels.keys().copied()
    }

    // ========== Moves ==========

    /// Atomically moves quantity between two zones.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a non-positive quantity, `SameZone`
    /// when source and destination match, `ZoneNotOperable` for the
    /// archive zone, and `InsufficientStock` when the source zone holds
    /// less than requested. A failed call changes nothing.
    pub fn transfer(
        &mut self,
        product_id: ProductId,
        from: Zone,
        to: Zone,
        qty: i64,
        remark: Option<String>,
        meta: MovementMeta,
    ) -> Result<MovementId, StockError> {
        Self::check_qty(qty)?;
        Self::check_operable(from)?;
        Self::check_operable(to)?;
        if from == to {
            return Err(StockError::SameZone(from));
        }
        self.check_available(product_id, from, qty)?;

        self.adjust(product_id, from, -qty);
        self.adjust(product_id, to, qty);
        Ok(self.log(
            product_id,
            MovementDetail::Transfer {
                from,
                to,
                qty,
                remark,
            },
            meta,
        ))
    }

    /// Records inbound goods into a zone.
    ///
    /// Inbound quantities are assumed verified upstream, so the increment
    /// is unconditional.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a non-positive quantity and
    /// `ZoneNotOperable` for the archive zone.
    pub fn receive(
        &mut self,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
        counterparty: impl Into<String>,
        reference: Option<String>,
        meta: MovementMeta,
    ) -> Result<MovementId, StockError> {
        Self::check_qty(qty)?;
        Self::check_operable(zone)?;

        self.adjust(product_id, zone, qty);
        Ok(self.log(
            product_id,
            MovementDetail::Manual {
                kind: MovementKind::Receipt,
                zone,
                qty,
                counterparty: counterparty.into(),
                reference,
            },
            meta,
        ))
    }

    /// Records outbound goods leaving a zone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a non-positive quantity,
    /// `ZoneNotOperable` for the archive zone, and `InsufficientStock`
    /// when the zone holds less than requested. A failed call changes
    /// nothing.
    pub fn deliver(
        &mut self,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
        counterparty: impl Into<String>,
        reference: Option<String>,
        meta: MovementMeta,
    ) -> Result<MovementId, StockError> {
        Self::check_qty(qty)?;
        Self::check_operable(zone)?;
        self.check_available(product_id, zone, qty)?;

        self.adjust(product_id, zone, -qty);
        Ok(self.log(
            product_id,
            MovementDetail::Manual {
                kind: MovementKind::Delivery,
                zone,
                qty,
                counterparty: counterparty.into(),
                reference,
            },
            meta,
        ))
    }

    /// Records migrated-history goods into the archive zone.
    ///
    /// Archived stock keeps imported documents auditable without entering
    /// operable totals. This is the only way quantity reaches the archive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a non-positive quantity.
    pub fn archive_receive(
        &mut self,
        product_id: ProductId,
        qty: i64,
        counterparty: impl Into<String>,
        reference: Option<String>,
        meta: MovementMeta,
    ) -> Result<MovementId, StockError> {
        Self::check_qty(qty)?;

        self.adjust(product_id, Zone::Archive, qty);
        Ok(self.log(
            product_id,
            MovementDetail::Manual {
                kind: MovementKind::Receipt,
                zone: Zone::Archive,
                qty,
                counterparty: counterparty.into(),
                reference,
            },
            meta,
        ))
    }

    // ========== Movement history ==========

    /// All movements in append order.
    #[must_use]
    pub fn movements(&self) -> &[StockMovement] {
        &self.movements
    }

    /// Most recent movements of a product, newest first.
    #[must_use]
    pub fn movements_for(&self, product_id: ProductId, limit: usize) -> Vec<&StockMovement> {
        self.movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .take(limit)
            .collect()
    }

    /// Days since each product last moved, slowest movers first.
    ///
    /// Products with no operable stock on hand are skipped.
    #[must_use]
    pub fn stock_ageing(&self, as_of: chrono::DateTime<chrono::Utc>) -> Vec<StockAge> {
        let mut ages: Vec<StockAge> = self
            .levels
            .keys()
            .filter_map(|&product_id| {
                let total = self.total(product_id);
                if total <= 0 {
                    return None;
                }
                let last_movement_at = self
                    .movements
                    .iter()
                    .rev()
                    .find(|m| m.product_id == product_id)
                    .map(|m| m.occurred_at)?;
                Some(StockAge {
                    product_id,
                    total,
                    last_movement_at,
                    idle_days: (as_of - last_movement_at).num_days().max(0),
                })
            })
            .collect();
        ages.sort_by(|a, b| b.idle_days.cmp(&a.idle_days));
        ages
    }

    // ========== Internals ==========

    fn check_qty(qty: i64) -> Result<(), StockError> {
        if qty <= 0 {
            return Err(StockError::InvalidQuantity(qty));
        }
        Ok(())
    }

    fn check_operable(zone: Zone) -> Result<(), StockError> {
        if !zone.is_operable() {
            return Err(StockError::ZoneNotOperable(zone));
        }
        Ok(())
    }

    fn check_available(
        &self,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
    ) -> Result<(), StockError> {
        let available = self.on_hand(product_id, zone);
        if available < qty {
            return Err(StockError::InsufficientStock {
                product_id,
                zone,
                available,
                requested: qty,
            });
        }
        Ok(())
    }

    fn adjust(&mut self, product_id: ProductId, zone: Zone, delta: i64) {
        let level = self
            .levels
            .entry(product_id)
            .or_default()
            .entry(zone)
            .or_insert(0);
        *level += delta;
        debug_assert!(*level >= 0, "zone quantity driven below zero");
    }

    fn log(&mut self, product_id: ProductId, detail: MovementDetail, meta: MovementMeta) -> MovementId {
        let movement = StockMovement {
            id: MovementId::new(),
            tenant_id: self.tenant_id,
            product_id,
            detail,
            occurred_at: meta.occurred_at,
            actor: meta.actor,
        };
        let id = movement.id;
        self.movements.push(movement);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn meta() -> MovementMeta {
        MovementMeta::now("tester")
    }

    fn stocked(product: ProductId, zone: Zone, qty: i64) -> StockLedger {
        let mut stock = StockLedger::new(TenantId::new());
        stock
            .receive(product, zone, qty, "Opening", None, meta())
            .unwrap();
        stock
    }

    #[test]
    fn test_receive_increments_zone() {
        let product = ProductId::new();
        let stock = stocked(product, Zone::Godown, 10);
        assert_eq!(stock.on_hand(product, Zone::Godown), 10);
        assert_eq!(stock.total(product), 10);
        assert_eq!(stock.movements().len(), 1);
    }

    #[test]
    fn test_transfer_moves_between_zones() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 10);
        stock
            .transfer(product, Zone::Godown, Zone::Display, 4, None, meta())
            .unwrap();
        assert_eq!(stock.on_hand(product, Zone::Godown), 6);
        assert_eq!(stock.on_hand(product, Zone::Display), 4);
        assert_eq!(stock.total(product), 10);
    }

    #[test]
    fn test_transfer_insufficient_leaves_state_unchanged() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 3);
        let result = stock.transfer(product, Zone::Godown, Zone::Display, 5, None, meta());
        assert!(matches!(result, Err(StockError::InsufficientStock { .. })));
        assert_eq!(stock.on_hand(product, Zone::Godown), 3);
        assert_eq!(stock.on_hand(product, Zone::Display), 0);
        // Failed calls are not logged.
        assert_eq!(stock.movements().len(), 1);
    }

    #[test]
    fn test_transfer_same_zone_rejected() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 3);
        assert!(matches!(
            stock.transfer(product, Zone::Godown, Zone::Godown, 1, None, meta()),
            Err(StockError::SameZone(Zone::Godown))
        ));
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 3);
        for qty in [0, -2] {
            assert!(matches!(
                stock.receive(product, Zone::Godown, qty, "X", None, meta()),
                Err(StockError::InvalidQuantity(_))
            ));
            assert!(matches!(
                stock.deliver(product, Zone::Godown, qty, "X", None, meta()),
                Err(StockError::InvalidQuantity(_))
            ));
            assert!(matches!(
                stock.transfer(product, Zone::Godown, Zone::Display, qty, None, meta()),
                Err(StockError::InvalidQuantity(_))
            ));
        }
    }

    #[test]
    fn test_deliver_decrements_and_checks() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Display, 5);
        stock
            .deliver(product, Zone::Display, 5, "Acme Retail", None, meta())
            .unwrap();
        assert_eq!(stock.on_hand(product, Zone::Display), 0);
        assert!(matches!(
            stock.deliver(product, Zone::Display, 1, "Acme Retail", None, meta()),
            Err(StockError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_archive_excluded_from_totals() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 10);
        stock
            .archive_receive(product, 7, "Migration", None, meta())
            .unwrap();
        assert_eq!(stock.on_hand(product, Zone::Archive), 7);
        assert_eq!(stock.total(product), 10);
        assert_eq!(stock.sellable(product), 10);
    }

    #[test]
    fn test_archive_rejects_operable_moves() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 10);
        assert!(matches!(
            stock.transfer(product, Zone::Godown, Zone::Archive, 1, None, meta()),
            Err(StockError::ZoneNotOperable(Zone::Archive))
        ));
        assert!(matches!(
            stock.receive(product, Zone::Archive, 1, "X", None, meta()),
            Err(StockError::ZoneNotOperable(Zone::Archive))
        ));
        assert!(matches!(
            stock.deliver(product, Zone::Archive, 1, "X", None, meta()),
            Err(StockError::ZoneNotOperable(Zone::Archive))
        ));
    }

    #[test]
    fn test_sellable_excludes_booked_and_repair() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 10);
        stock
            .transfer(product, Zone::Godown, Zone::Booked, 3, None, meta())
            .unwrap();
        stock
            .transfer(product, Zone::Godown, Zone::Repair, 2, None, meta())
            .unwrap();
        assert_eq!(stock.total(product), 10);
        assert_eq!(stock.sellable(product), 5);
    }

    #[test]
    fn test_movements_for_newest_first() {
        let product = ProductId::new();
        let mut stock = stocked(product, Zone::Godown, 10);
        stock
            .transfer(product, Zone::Godown, Zone::Display, 1, Some("first".into()), meta())
            .unwrap();
        stock
            .transfer(product, Zone::Godown, Zone::Display, 1, Some("second".into()), meta())
            .unwrap();

        let history = stock.movements_for(product, 2);
        assert_eq!(history.len(), 2);
        assert!(matches!(
            &history[0].detail,
            MovementDetail::Transfer { remark: Some(r), .. } if r == "second"
        ));
    }

    #[test]
    fn test_stock_ageing_orders_slowest_movers_first() {
        let tenant = TenantId::new();
        let mut stock = StockLedger::new(tenant);
        let stale = ProductId::new();
        let fresh = ProductId::new();
        let now = Utc::now();

        stock
            .receive(
                stale,
                Zone::Godown,
                5,
                "Opening",
                None,
                MovementMeta::at("tester", now - Duration::days(40)),
            )
            .unwrap();
        stock
            .receive(
                fresh,
                Zone::Godown,
                5,
                "Opening",
                None,
                MovementMeta::at("tester", now - Duration::days(2)),
            )
            .unwrap();

        let ages = stock.stock_ageing(now);
        assert_eq!(ages.len(), 2);
        assert_eq!(ages[0].product_id, stale);
        assert_eq!(ages[0].idle_days, 40);
        assert_eq!(ages[1].product_id, fresh);
        assert_eq!(ages[1].idle_days, 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Receive { zone: usize, qty: i64 },
            Deliver { zone: usize, qty: i64 },
            Transfer { from: usize, to: usize, qty: i64 },
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..4, 1i64..50).prop_map(|(zone, qty)| Op::Receive { zone, qty }),
                (0usize..4, 1i64..50).prop_map(|(zone, qty)| Op::Deliver { zone, qty }),
                (0usize..4, 0usize..4, 1i64..50)
                    .prop_map(|(from, to, qty)| Op::Transfer { from, to, qty }),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            /// No sequence of moves can drive any zone negative, and a
            /// failed call leaves all levels exactly as they were.
            #[test]
            fn prop_zones_never_go_negative(ops in prop::collection::vec(op_strategy(), 0..60)) {
                let product = ProductId::new();
                let mut stock = StockLedger::new(TenantId::new());

                for op in ops {
                    let before = stock.quantities(product);
                    let result = match op {
                        Op::Receive { zone, qty } => stock
                            .receive(product, Zone::OPERABLE[zone], qty, "P", None, meta())
                            .map(|_| ()),
                        Op::Deliver { zone, qty } => stock
                            .deliver(product, Zone::OPERABLE[zone], qty, "P", None, meta())
                            .map(|_| ()),
                        Op::Transfer { from, to, qty } => stock
                            .transfer(product, Zone::OPERABLE[from], Zone::OPERABLE[to], qty, None, meta())
                            .map(|_| ()),
                    };

                    if result.is_err() {
                        prop_assert_eq!(stock.quantities(product), before);
                    }
                    for (_, qty) in stock.quantities(product) {
                        prop_assert!(qty >= 0);
                    }
                }
            }

            /// Levels are always reconstructable as the sum of movements.
            #[test]
            fn prop_levels_equal_sum_of_movements(ops in prop::collection::vec(op_strategy(), 0..60)) {
                let product = ProductId::new();
                let mut stock = StockLedger::new(TenantId::new());

                for op in ops {
                    let _ = match op {
                        Op::Receive { zone, qty } => stock
                            .receive(product, Zone::OPERABLE[zone], qty, "P", None, meta())
                            .map(|_| ()),
                        Op::Deliver { zone, qty } => stock
                            .deliver(product, Zone::OPERABLE[zone], qty, "P", None, meta())
                            .map(|_| ()),
                        Op::Transfer { from, to, qty } => stock
                            .transfer(product, Zone::OPERABLE[from], Zone::OPERABLE[to], qty, None, meta())
                            .map(|_| ()),
                    };
                }

                let mut replayed: BTreeMap<Zone, i64> =
                    Zone::OPERABLE.into_iter().map(|z| (z, 0)).collect();
                for movement in stock.movements() {
                    match &movement.detail {
                        MovementDetail::Transfer { from, to, qty, .. } => {
                            *replayed.get_mut(from).unwrap() -= qty;
                            *replayed.get_mut(to).unwrap() += qty;
                        }
                        MovementDetail::Manual { kind, zone, qty, .. } => {
                            let delta = match kind {
                                MovementKind::Receipt => *qty,
                                MovementKind::Delivery => -qty,
                            };
                            *replayed.get_mut(zone).unwrap() += delta;
                        }
                    }
                }
                prop_assert_eq!(stock.quantities(product), replayed);
            }
        }
    }
}

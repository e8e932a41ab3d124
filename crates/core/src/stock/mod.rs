//! Multi-zone warehouse stock ledger.
//!
//! This module implements the goods side of the engine:
//! - Per-product, per-zone quantities (Godown, Display, Booked, Repair)
//! - Atomic transfers, receipts, and deliveries with insufficiency checks
//! - An append-only movement log for audit, history, and stock ageing
//! - A read-only archive zone for migrated history

pub mod error;
pub mod service;
pub mod types;

pub use error::StockError;
pub use service::StockLedger;
pub use types::{
    MovementDetail, MovementKind, MovementMeta, StockAge, StockMovement, Zone,
};

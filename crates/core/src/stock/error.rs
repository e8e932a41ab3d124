//! Stock ledger error types.

use sauda_shared::types::ProductId;
use thiserror::Error;

use super::types::Zone;

/// Errors that can occur during warehouse stock operations.
#[derive(Debug, Error)]
pub enum StockError {
    /// Quantity must be positive.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Zone holds less stock than requested.
    #[error(
        "Insufficient stock for product {product_id} in zone {zone}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// The product being moved.
        product_id: ProductId,
        /// The zone being drawn from.
        zone: Zone,
        /// Units currently in the zone.
        available: i64,
        /// Units requested.
        requested: i64,
    },

    /// Source and destination zones of a transfer must differ.
    #[error("Source and destination zones must differ, both are {0}")]
    SameZone(Zone),

    /// Zone does not accept operable stock moves.
    #[error("Zone {0} is read-only history and does not accept stock operations")]
    ZoneNotOperable(Zone),
}

impl StockError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::SameZone(_) => "SAME_ZONE",
            Self::ZoneNotOperable(_) => "ZONE_NOT_OPERABLE",
        }
    }
}

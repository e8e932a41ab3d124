//! Warehouse stock domain types.

use chrono::{DateTime, Utc};
use sauda_shared::types::{MovementId, ProductId, TenantId};
use serde::{Deserialize, Serialize};

/// A named stock-holding bucket for a product within the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Back-store bulk storage.
    Godown,
    /// Showroom / shop-floor display.
    Display,
    /// Reserved against confirmed sales orders.
    Booked,
    /// Held out of circulation for repair or inspection.
    Repair,
    /// Read-only bucket for migrated history; excluded from operable totals.
    Archive,
}

impl Zone {
    /// Zones that participate in day-to-day stock operations.
    pub const OPERABLE: [Self; 4] = [Self::Godown, Self::Display, Self::Booked, Self::Repair];

    /// Returns true if the zone accepts operable stock moves.
    #[must_use]
    pub fn is_operable(self) -> bool {
        !matches!(self, Self::Archive)
    }

    /// Returns true if quantity in this zone is available for sale.
    ///
    /// Booked stock is reserved and repair stock is out of circulation,
    /// so only Godown and Display count toward the sellable figure.
    #[must_use]
    pub fn is_sellable(self) -> bool {
        matches!(self, Self::Godown | Self::Display)
    }

    /// Returns the display name of the zone.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Godown => "godown",
            Self::Display => "display",
            Self::Booked => "booked",
            Self::Repair => "repair",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a manual stock transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Inbound goods (purchase receipt, customer return).
    Receipt,
    /// Outbound goods (sales delivery, write-off).
    Delivery,
}

/// Audit metadata carried by every stock movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementMeta {
    /// Who performed the movement.
    pub actor: String,
    /// When the movement happened.
    pub occurred_at: DateTime<Utc>,
}

impl MovementMeta {
    /// Creates movement metadata stamped with the current time.
    #[must_use]
    pub fn now(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            occurred_at: Utc::now(),
        }
    }

    /// Creates movement metadata with an explicit timestamp.
    #[must_use]
    pub fn at(actor: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            occurred_at,
        }
    }
}

/// What a movement did to the stock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementDetail {
    /// Quantity moved between two zones.
    Transfer {
        /// Source zone.
        from: Zone,
        /// Destination zone.
        to: Zone,
        /// Units moved.
        qty: i64,
        /// Free-form annotation (e.g. the document number that booked it).
        remark: Option<String>,
    },
    /// Quantity entering or leaving the warehouse.
    Manual {
        /// Receipt or delivery.
        kind: MovementKind,
        /// Zone the quantity entered or left.
        zone: Zone,
        /// Units moved.
        qty: i64,
        /// Counterparty name snapshot.
        counterparty: String,
        /// External reference (document or challan number).
        reference: Option<String>,
    },
}

/// Append-only audit record of one stock state change.
///
/// The live zone levels are always reconstructable as the sum of these
/// records; they exist so history views and stock ageing never have to
/// re-derive anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier.
    pub id: MovementId,
    /// Tenant this movement belongs to.
    pub tenant_id: TenantId,
    /// Product that moved.
    pub product_id: ProductId,
    /// What happened.
    pub detail: MovementDetail,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
    /// Who performed it.
    pub actor: String,
}

/// Days since a product last moved, for the stock ageing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAge {
    /// Product being aged.
    pub product_id: ProductId,
    /// Operable stock on hand.
    pub total: i64,
    /// Timestamp of the most recent movement.
    pub last_movement_at: DateTime<Utc>,
    /// Whole days elapsed since the last movement.
    pub idle_days: i64,
}

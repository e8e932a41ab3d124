//! Document status derivation.
//!
//! Status is derived, never stored as free choice: after any
//! quantity-changing operation it is recomputed from the aggregate of
//! line-item quantities, so a stored status can never drift from the
//! underlying data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DocumentKind, LineItem};

/// Lifecycle status of a trade document.
///
/// Sales documents move `Quotation → QuotationSent → SalesOrder →
/// {PartiallyDelivered → FullyDelivered} → {PartiallyBilled →
/// FullyBilled}`; purchase documents move `Rfq → PurchaseOrder →
/// {GrnPartial → GrnCompleted} → {PartiallyBilled → Billed}`. `Cancelled`
/// is reachable from any pre-fulfillment state and `Migrated` is the
/// terminal state of imported history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Sales draft awaiting the customer.
    Quotation,
    /// Quotation shared with the customer.
    QuotationSent,
    /// Confirmed sales order.
    SalesOrder,
    /// Some but not all ordered units delivered.
    PartiallyDelivered,
    /// Every ordered unit delivered.
    FullyDelivered,
    /// Purchase draft (request for quotation).
    Rfq,
    /// Confirmed purchase order.
    PurchaseOrder,
    /// Some but not all ordered units received.
    GrnPartial,
    /// Every ordered unit received.
    GrnCompleted,
    /// Some but not all fulfilled units invoiced or billed.
    PartiallyBilled,
    /// Every ordered unit invoiced (sales terminal).
    FullyBilled,
    /// Every ordered unit billed (purchase terminal).
    Billed,
    /// Cancelled before any fulfillment.
    Cancelled,
    /// Imported history; read-only.
    Migrated,
}

impl DocumentStatus {
    /// Returns the display name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quotation => "quotation",
            Self::QuotationSent => "quotation_sent",
            Self::SalesOrder => "sales_order",
            Self::PartiallyDelivered => "partially_delivered",
            Self::FullyDelivered => "fully_delivered",
            Self::Rfq => "rfq",
            Self::PurchaseOrder => "purchase_order",
            Self::GrnPartial => "grn_partial",
            Self::GrnCompleted => "grn_completed",
            Self::PartiallyBilled => "partially_billed",
            Self::FullyBilled => "fully_billed",
            Self::Billed => "billed",
            Self::Cancelled => "cancelled",
            Self::Migrated => "migrated",
        }
    }

    /// Returns true before any quantity has flowed (edit and cancel are
    /// still permitted).
    #[must_use]
    pub fn is_pre_fulfillment(self) -> bool {
        matches!(
            self,
            Self::Quotation | Self::QuotationSent | Self::SalesOrder | Self::Rfq | Self::PurchaseOrder
        )
    }

    /// Returns true for unconfirmed drafting stages.
    #[must_use]
    pub fn is_draft_stage(self) -> bool {
        matches!(self, Self::Quotation | Self::QuotationSent | Self::Rfq)
    }

    /// Returns true for terminal states that accept no further operations.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Migrated)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status derived from `amount_paid` against the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing collected or paid yet.
    Unpaid,
    /// Part of the grand total collected or paid.
    Partial,
    /// Grand total fully collected or paid.
    Paid,
}

/// Derives the lifecycle status from the aggregate line quantities.
///
/// `stage` is the document's current status; it is returned unchanged
/// while no quantity has flowed (drafting, confirmation, cancellation and
/// migration are transitions of the stage itself, not of quantities).
#[must_use]
pub fn derive_status(kind: DocumentKind, stage: DocumentStatus, lines: &[LineItem]) -> DocumentStatus {
    if stage.is_terminal() {
        return stage;
    }

    let ordered: i64 = lines.iter().map(|l| l.ordered).sum();
    let fulfilled: i64 = lines.iter().map(|l| l.fulfilled).sum();
    let settled: i64 = lines.iter().map(|l| l.settled).sum();

    if settled > 0 {
        if settled == ordered {
            match kind {
                DocumentKind::Sales => DocumentStatus::FullyBilled,
                DocumentKind::Purchase => DocumentStatus::Billed,
            }
        } else {
            DocumentStatus::PartiallyBilled
        }
    } else if fulfilled > 0 {
        match kind {
            DocumentKind::Sales if fulfilled == ordered => DocumentStatus::FullyDelivered,
            DocumentKind::Sales => DocumentStatus::PartiallyDelivered,
            DocumentKind::Purchase if fulfilled == ordered => DocumentStatus::GrnCompleted,
            DocumentKind::Purchase => DocumentStatus::GrnPartial,
        }
    } else {
        stage
    }
}

/// Derives the payment status by comparing `amount_paid` to the grand
/// total.
#[must_use]
pub fn derive_payment_status(amount_paid: Decimal, grand_total: Decimal) -> PaymentStatus {
    if amount_paid <= Decimal::ZERO {
        PaymentStatus::Unpaid
    } else if amount_paid < grand_total {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Paid
    }
}

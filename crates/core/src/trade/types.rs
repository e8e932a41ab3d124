//! Trade document domain types.
//!
//! A trade document (sales or purchase) owns line items whose quantities
//! flow through an ordered/fulfilled/settled triple. The invariant
//! `0 ≤ settled ≤ fulfilled ≤ ordered` holds at all times; quantities are
//! monotonically non-decreasing once they flow.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sauda_shared::types::{DocumentId, EntryId, PartyId, ProductId, TenantId};
use sauda_shared::types::{percent_of, round_money};
use serde::{Deserialize, Serialize};

use super::error::TradeError;
use super::status::{DocumentStatus, PaymentStatus};
use crate::stock::Zone;

/// Whether a document sells goods to a customer or buys from a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Sales: quotation → sales order → delivery → invoice.
    Sales,
    /// Purchase: RFQ → purchase order → GRN → bill.
    Purchase,
}

impl DocumentKind {
    /// Returns the display name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Purchase => "purchase",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    /// Created through a lifecycle operation.
    Live,
    /// Imported history; read-only.
    Migration,
}

/// Denormalized product fields captured when a line is drafted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// The product's id in the catalogue.
    pub id: ProductId,
    /// Name at drafting time.
    pub name: String,
    /// SKU at drafting time.
    pub sku: String,
    /// Brand, if the catalogue carries one.
    pub brand: Option<String>,
    /// Image reference, if any.
    pub image: Option<String>,
}

/// Denormalized counterparty fields captured when the document is drafted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartySnapshot {
    /// The counterparty's id in the party directory.
    pub id: PartyId,
    /// Name at drafting time.
    pub name: String,
}

/// One line of a trade document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Units ordered.
    pub ordered: i64,
    /// Units delivered (sales) or received (purchase) so far.
    pub fulfilled: i64,
    /// Units invoiced (sales) or billed (purchase) so far.
    pub settled: i64,
    /// Price per unit before discount and tax.
    pub unit_price: Decimal,
    /// Discount percentage on the line.
    pub discount_pct: Decimal,
    /// Tax percentage applied after discount.
    pub tax_pct: Decimal,
    /// Net value of the full ordered quantity.
    pub line_total: Decimal,
}

impl LineItem {
    /// Creates a fresh line with no quantities flowed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the ordered quantity is not positive, the unit
    /// price is negative, or either percentage is outside 0–100.
    pub fn new(
        product: ProductSnapshot,
        ordered: i64,
        unit_price: Decimal,
        discount_pct: Decimal,
        tax_pct: Decimal,
    ) -> Result<Self, TradeError> {
        if ordered <= 0 {
            return Err(TradeError::InvalidQuantity(ordered));
        }
        if unit_price < Decimal::ZERO {
            return Err(TradeError::InvalidAmount(unit_price));
        }
        for pct in [discount_pct, tax_pct] {
            if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(TradeError::InvalidPercentage(pct));
            }
        }

        let mut line = Self {
            product,
            ordered,
            fulfilled: 0,
            settled: 0,
            unit_price,
            discount_pct,
            tax_pct,
            line_total: Decimal::ZERO,
        };
        line.line_total = line.value_of(ordered);
        Ok(line)
    }

    /// Per-unit value after discount and tax, unrounded.
    #[must_use]
    pub fn unit_net(&self) -> Decimal {
        let discounted = self.unit_price - percent_of(self.unit_price, self.discount_pct);
        discounted + percent_of(discounted, self.tax_pct)
    }

    /// Net value of `qty` units, rounded to money precision.
    #[must_use]
    pub fn value_of(&self, qty: i64) -> Decimal {
        round_money(Decimal::from(qty) * self.unit_net())
    }

    /// Units still awaiting fulfillment.
    #[must_use]
    pub fn remaining_to_fulfill(&self) -> i64 {
        self.ordered - self.fulfilled
    }

    /// Fulfilled units not yet settled.
    #[must_use]
    pub fn remaining_to_settle(&self) -> i64 {
        self.fulfilled - self.settled
    }
}

/// Computed monetary totals of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Σ line gross values before discount and tax.
    pub subtotal: Decimal,
    /// Σ line discounts.
    pub discount: Decimal,
    /// Σ line taxes (applied after discount).
    pub tax: Decimal,
    /// Σ line totals.
    pub grand_total: Decimal,
}

impl DocumentTotals {
    /// Recomputes totals from lines.
    #[must_use]
    pub fn from_lines(lines: &[LineItem]) -> Self {
        let mut subtotal = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        let mut tax = Decimal::ZERO;
        let mut grand_total = Decimal::ZERO;

        for line in lines {
            let gross = Decimal::from(line.ordered) * line.unit_price;
            let line_discount = percent_of(gross, line.discount_pct);
            subtotal += round_money(gross);
            discount += round_money(line_discount);
            tax += round_money(percent_of(gross - line_discount, line.tax_pct));
            grand_total += line.line_total;
        }

        Self {
            subtotal,
            discount,
            tax,
            grand_total,
        }
    }
}

/// A quantity against one line, used by fulfillment and settlement
/// records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityLine {
    /// The line's product.
    pub product_id: ProductId,
    /// Units moved in this step.
    pub qty: i64,
}

/// One delivery (sales) or goods receipt (purchase) against a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentRecord {
    /// Delivery note (`DN-…`) or GRN (`GRN-…`) number.
    pub number: String,
    /// Business date of the movement.
    pub date: NaiveDate,
    /// Warehouse zone the goods left or entered.
    pub zone: Zone,
    /// Quantities per line.
    pub lines: Vec<QuantityLine>,
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
}

/// One invoice (sales) or bill (purchase) against a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Invoice (`INV-…`) or bill (`BILL-…`) number.
    pub number: String,
    /// Business date of the settlement.
    pub date: NaiveDate,
    /// Settled value of the quantities in this step.
    pub amount: Decimal,
    /// Quantities per line.
    pub lines: Vec<QuantityLine>,
    /// The ledger leg this settlement posted.
    pub entry_id: EntryId,
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
}

/// A sales or purchase document with its full lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDocument {
    /// Unique identifier.
    pub id: DocumentId,
    /// Tenant this document belongs to.
    pub tenant_id: TenantId,
    /// Current document number (`QT-…`/`SO-…`/`RFQ-…`/`PO-…`).
    pub number: String,
    /// The drafting-stage number, kept when `confirm` issues a fresh one.
    pub quotation_number: Option<String>,
    /// Sales or purchase.
    pub kind: DocumentKind,
    /// Date the document was issued.
    pub issue_date: NaiveDate,
    /// Expected fulfillment date, if agreed.
    pub expected_date: Option<NaiveDate>,
    /// Counterparty snapshot.
    pub party: PartySnapshot,
    /// Default warehouse zone for fulfillment.
    pub zone: Zone,
    /// Line items.
    pub lines: Vec<LineItem>,
    /// Computed totals, recomputed on every line mutation.
    pub totals: DocumentTotals,
    /// Amount collected (sales) or paid (purchase) so far.
    pub amount_paid: Decimal,
    /// Derived lifecycle status.
    pub status: DocumentStatus,
    /// Derived payment status.
    pub payment_status: PaymentStatus,
    /// Live or migrated.
    pub source: DocumentSource,
    /// Deliveries / goods receipts against this document.
    pub fulfillments: Vec<FulfillmentRecord>,
    /// Invoices / bills against this document.
    pub settlements: Vec<SettlementRecord>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document last changed.
    pub updated_at: DateTime<Utc>,
}

impl TradeDocument {
    /// Returns true for imported, read-only documents.
    #[must_use]
    pub fn is_historical(&self) -> bool {
        self.source == DocumentSource::Migration
    }

    /// Amount still owed on the document.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.totals.grand_total - self.amount_paid
    }

    /// The line for a product, if the document carries one.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    /// Mutable access to the line for a product.
    pub fn line_mut(&mut self, product_id: ProductId) -> Option<&mut LineItem> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }

    /// Fails with `ReadOnlyHistorical` for migrated documents.
    pub fn ensure_mutable(&self) -> Result<(), TradeError> {
        if self.is_historical() {
            return Err(TradeError::ReadOnlyHistorical);
        }
        Ok(())
    }
}

//! Engine facade types and collaborator contracts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sauda_shared::types::{AccountId, ExpenseId, PartyId, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::PartyKind;
use crate::trade::{DocumentKind, ProductSnapshot};

/// Resolves the active tenant scoping every operation.
///
/// Supplied by the surrounding application (company selection lives
/// outside the engine).
pub trait TenantResolver {
    /// The tenant all reads and writes are scoped to.
    fn active_tenant(&self) -> TenantId;
}

/// Counterparty master data looked up at posting time.
///
/// The engine stores only the party id plus a denormalized name
/// snapshot; names, kinds and opening balances live in the directory.
pub trait PartyDirectory {
    /// The profile of a party, if the directory knows it.
    fn profile(&self, id: PartyId) -> Option<PartyProfile>;
}

/// Master data of one counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyProfile {
    /// Unique identifier.
    pub id: PartyId,
    /// Display name.
    pub name: String,
    /// Customer or supplier (fixes the balance sign convention).
    pub kind: PartyKind,
    /// Balance carried in from before the ledger's first entry.
    pub opening_balance: Decimal,
    /// Tax registration number, if registered.
    pub gstin: Option<String>,
    /// Billing address, if known.
    pub address: Option<String>,
}

/// In-memory party directory for tests and the seeder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryPartyDirectory {
    parties: BTreeMap<PartyId, PartyProfile>,
}

impl InMemoryPartyDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a party and returns its id.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: PartyKind,
        opening_balance: Decimal,
    ) -> PartyId {
        let profile = PartyProfile {
            id: PartyId::new(),
            name: name.into(),
            kind,
            opening_balance,
            gstin: None,
            address: None,
        };
        let id = profile.id;
        self.parties.insert(id, profile);
        id
    }
}

impl PartyDirectory for InMemoryPartyDirectory {
    fn profile(&self, id: PartyId) -> Option<PartyProfile> {
        self.parties.get(&id).cloned()
    }
}

/// Per-kind document number counters for one tenant.
///
/// Drafts take `QT-`/`RFQ-` numbers; `confirm` issues a fresh `SO-`/`PO-`
/// number; settlements and fulfillments draw from their own series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentCounters {
    quotation: u32,
    sales_order: u32,
    rfq: u32,
    purchase_order: u32,
    invoice: u32,
    bill: u32,
    delivery_note: u32,
    grn: u32,
}

impl DocumentCounters {
    fn issue(counter: &mut u32, prefix: &str) -> String {
        *counter += 1;
        format!("{prefix}-{counter:04}")
    }

    /// Next drafting number for a document kind.
    pub fn next_draft(&mut self, kind: DocumentKind) -> String {
        match kind {
            DocumentKind::Sales => Self::issue(&mut self.quotation, "QT"),
            DocumentKind::Purchase => Self::issue(&mut self.rfq, "RFQ"),
        }
    }

    /// Next confirmed-order number for a document kind.
    pub fn next_order(&mut self, kind: DocumentKind) -> String {
        match kind {
            DocumentKind::Sales => Self::issue(&mut self.sales_order, "SO"),
            DocumentKind::Purchase => Self::issue(&mut self.purchase_order, "PO"),
        }
    }

    /// Next fulfillment number (delivery note or GRN).
    pub fn next_fulfillment(&mut self, kind: DocumentKind) -> String {
        match kind {
            DocumentKind::Sales => Self::issue(&mut self.delivery_note, "DN"),
            DocumentKind::Purchase => Self::issue(&mut self.grn, "GRN"),
        }
    }

    /// Next settlement number (invoice or bill).
    pub fn next_settlement(&mut self, kind: DocumentKind) -> String {
        match kind {
            DocumentKind::Sales => Self::issue(&mut self.invoice, "INV"),
            DocumentKind::Purchase => Self::issue(&mut self.bill, "BILL"),
        }
    }
}

/// An operating expense paid out of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Tenant this expense belongs to.
    pub tenant_id: TenantId,
    /// Business date.
    pub date: NaiveDate,
    /// Expense category ("Rent", "Electricity", "Salaries").
    pub category: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Account the expense was paid from.
    pub account_id: AccountId,
    /// Payee and details.
    pub description: String,
}

/// Input for one line of a drafted document.
#[derive(Debug, Clone)]
pub struct DraftLine {
    /// Product snapshot from the catalogue.
    pub product: ProductSnapshot,
    /// Units ordered.
    pub qty: i64,
    /// Price per unit before discount and tax.
    pub unit_price: Decimal,
    /// Discount percentage on the line.
    pub discount_pct: Decimal,
    /// Tax percentage applied after discount.
    pub tax_pct: Decimal,
}

/// Input for one line of an imported historical document.
#[derive(Debug, Clone)]
pub struct HistoricalLine {
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Units ordered.
    pub ordered: i64,
    /// Units fulfilled before migration.
    pub fulfilled: i64,
    /// Units settled before migration.
    pub settled: i64,
    /// Price per unit before discount and tax.
    pub unit_price: Decimal,
    /// Discount percentage on the line.
    pub discount_pct: Decimal,
    /// Tax percentage applied after discount.
    pub tax_pct: Decimal,
}

/// An imported document from a previous system.
#[derive(Debug, Clone)]
pub struct HistoricalDocument {
    /// Sales or purchase.
    pub kind: DocumentKind,
    /// The number the previous system assigned.
    pub number: String,
    /// Date the document was issued.
    pub issue_date: NaiveDate,
    /// Counterparty id in the directory.
    pub party_id: PartyId,
    /// Lines with their migrated quantity triples.
    pub lines: Vec<HistoricalLine>,
    /// Amount already collected or paid before migration.
    pub amount_paid: Decimal,
}

//! The engine facade: one tenant's complete books.
//!
//! `TenantBooks` owns the stock ledger, the financial ledger, the trade
//! documents, the expense records and the document counters, and exposes
//! every lifecycle operation. Each operation validates everything before
//! applying any side effect (check-then-act), so a rejected call leaves
//! the whole state untouched even when it would have spanned both the
//! stock and the financial ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sauda_shared::types::{
    AccountId, DocumentId, EntryId, ExpenseId, PartyId, ProductId, TenantId,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::types::{
    DocumentCounters, DraftLine, ExpenseRecord, HistoricalDocument, PartyDirectory, PartyProfile,
    TenantResolver,
};
use crate::error::EngineError;
use crate::ledger::{
    AccountKind, EntryType, FinancialLedger, LedgerError, LedgerRow, LegDraft, Side,
};
use crate::stock::{MovementMeta, StockError, StockLedger, Zone};
use crate::trade::{
    DocumentKind, DocumentSource, DocumentStatus, DocumentTotals, FulfillmentRecord, LineItem,
    PartySnapshot, PaymentStatus, QuantityLine, SettlementRecord, TradeDocument, TradeError,
    derive_payment_status, derive_status,
};

/// One tenant's complete state: stock, ledger, documents, expenses and
/// counters. This is the blob the persistence adapter loads and saves;
/// `updated_at` is the last-write-wins comparand the external sync
/// process uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantBooks {
    tenant_id: TenantId,
    stock: StockLedger,
    ledger: FinancialLedger,
    documents: BTreeMap<DocumentId, TradeDocument>,
    expenses: Vec<ExpenseRecord>,
    counters: DocumentCounters,
    updated_at: DateTime<Utc>,
}

impl TenantBooks {
    /// Creates empty books for a tenant.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            stock: StockLedger::new(tenant_id),
            ledger: FinancialLedger::new(tenant_id),
            documents: BTreeMap::new(),
            expenses: Vec::new(),
            counters: DocumentCounters::default(),
            updated_at: Utc::now(),
        }
    }

    /// Creates empty books for the resolver's active tenant.
    #[must_use]
    pub fn for_tenant(resolver: &dyn TenantResolver) -> Self {
        Self::new(resolver.active_tenant())
    }

    /// The tenant these books belong to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Last-write-wins timestamp, stamped by every mutating operation.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Read access to the stock ledger.
    #[must_use]
    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    /// Read access to the financial ledger.
    #[must_use]
    pub fn ledger(&self) -> &FinancialLedger {
        &self.ledger
    }

    /// Expense records in append order.
    #[must_use]
    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ========================================================================
    // Accounts & ledger
    // ========================================================================

    /// Opens a financial account.
    pub fn open_account(
        &mut self,
        name: impl Into<String>,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> AccountId {
        let id = self.ledger.open_account(name, kind, opening_balance);
        self.touch();
        id
    }

    /// Current balance of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account.
    pub fn account_balance(&self, id: AccountId) -> Result<Decimal, EngineError> {
        Ok(self.ledger.account_balance(id)?)
    }

    /// Current balance of a party under its directory kind and opening
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if the directory does not know the party.
    pub fn party_balance(
        &self,
        id: PartyId,
        directory: &dyn PartyDirectory,
    ) -> Result<Decimal, EngineError> {
        let profile = self.party_profile(id, directory)?;
        Ok(self
            .ledger
            .party_balance(id, profile.kind, profile.opening_balance))
    }

    /// Running ledger of an account, most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account.
    pub fn account_ledger(&self, id: AccountId) -> Result<Vec<LedgerRow>, EngineError> {
        Ok(self.ledger.account_ledger(id)?)
    }

    /// Running ledger of a party, most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if the directory does not know the party.
    pub fn party_ledger(
        &self,
        id: PartyId,
        directory: &dyn PartyDirectory,
    ) -> Result<Vec<LedgerRow>, EngineError> {
        let profile = self.party_profile(id, directory)?;
        Ok(self
            .ledger
            .party_ledger(id, profile.kind, profile.opening_balance))
    }

    /// Flips the reconciliation flag of a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` for an unknown entry.
    pub fn toggle_reconciled(&mut self, id: EntryId) -> Result<bool, EngineError> {
        let state = self.ledger.toggle_reconciled(id)?;
        self.touch();
        Ok(state)
    }

    /// Moves money between two accounts.
    ///
    /// # Errors
    ///
    /// See [`FinancialLedger::transfer_funds`].
    pub fn transfer_funds(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        date: NaiveDate,
        reference: impl Into<String>,
    ) -> Result<(EntryId, EntryId), EngineError> {
        let legs = self.ledger.transfer_funds(from, to, amount, date, reference)?;
        self.touch();
        info!(%from, %to, %amount, "Funds transferred");
        Ok(legs)
    }

    /// Checks the incremental balance caches against a full-scan
    /// recomputation.
    #[must_use]
    pub fn verify_balances(&self) -> bool {
        self.ledger.verify_balances()
    }

    fn party_profile(
        &self,
        id: PartyId,
        directory: &dyn PartyDirectory,
    ) -> Result<PartyProfile, EngineError> {
        directory.profile(id).ok_or(EngineError::PartyNotFound(id))
    }

    // ========================================================================
    // Manual warehouse operations
    // ========================================================================

    /// Moves stock between two zones.
    ///
    /// # Errors
    ///
    /// See [`StockLedger::transfer`].
    pub fn transfer_stock(
        &mut self,
        product_id: ProductId,
        from: Zone,
        to: Zone,
        qty: i64,
        remark: Option<String>,
        actor: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.stock
            .transfer(product_id, from, to, qty, remark, MovementMeta::now(actor))?;
        self.touch();
        info!(%product_id, %from, %to, qty, "Stock transferred");
        Ok(())
    }

    /// Records inbound goods outside any purchase document.
    ///
    /// # Errors
    ///
    /// See [`StockLedger::receive`].
    pub fn receive_stock(
        &mut self,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
        counterparty: impl Into<String>,
        reference: Option<String>,
        actor: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.stock.receive(
            product_id,
            zone,
            qty,
            counterparty,
            reference,
            MovementMeta::now(actor),
        )?;
        self.touch();
        Ok(())
    }

    /// Records outbound goods outside any sales document.
    ///
    /// # Errors
    ///
    /// See [`StockLedger::deliver`].
    pub fn deliver_stock(
        &mut self,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
        counterparty: impl Into<String>,
        reference: Option<String>,
        actor: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.stock.deliver(
            product_id,
            zone,
            qty,
            counterparty,
            reference,
            MovementMeta::now(actor),
        )?;
        self.touch();
        Ok(())
    }

    // ========================================================================
    // Trade document lifecycle
    // ========================================================================

    /// Looks up a document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` for an unknown id.
    pub fn document(&self, id: DocumentId) -> Result<&TradeDocument, EngineError> {
        self.documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))
    }

    /// All documents, ordered by id (UUID v7, so creation-ordered).
    pub fn documents(&self) -> impl Iterator<Item = &TradeDocument> {
        self.documents.values()
    }

    /// Drafts a new quotation (sales) or RFQ (purchase).
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` for an unknown party, `EmptyLines` for a
    /// draft without lines, `DuplicateProduct` when a product appears
    /// twice, and line validation errors for bad quantities, prices or
    /// percentages.
    #[allow(clippy::too_many_arguments)]
    pub fn draft_document(
        &mut self,
        kind: DocumentKind,
        party_id: PartyId,
        zone: Zone,
        lines: Vec<DraftLine>,
        issue_date: NaiveDate,
        expected_date: Option<NaiveDate>,
        directory: &dyn PartyDirectory,
    ) -> Result<DocumentId, EngineError> {
        let profile = self.party_profile(party_id, directory)?;
        let lines = Self::build_lines(lines)?;
        let totals = DocumentTotals::from_lines(&lines);

        let now = Utc::now();
        let document = TradeDocument {
            id: DocumentId::new(),
            tenant_id: self.tenant_id,
            number: self.counters.next_draft(kind),
            quotation_number: None,
            kind,
            issue_date,
            expected_date,
            party: PartySnapshot {
                id: profile.id,
                name: profile.name,
            },
            zone,
            lines,
            totals,
            amount_paid: Decimal::ZERO,
            status: match kind {
                DocumentKind::Sales => DocumentStatus::Quotation,
                DocumentKind::Purchase => DocumentStatus::Rfq,
            },
            payment_status: PaymentStatus::Unpaid,
            source: DocumentSource::Live,
            fulfillments: Vec::new(),
            settlements: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = document.id;
        info!(number = %document.number, kind = %kind, "Document drafted");
        self.documents.insert(id, document);
        self.touch();
        Ok(id)
    }

    /// Marks a sales quotation as sent to the customer.
    ///
    /// # Errors
    ///
    /// Returns `WrongKind` for purchase documents and `InvalidTransition`
    /// unless the document is a fresh quotation.
    pub fn mark_quotation_sent(&mut self, id: DocumentId) -> Result<(), EngineError> {
        let doc = self.document_mut(id)?;
        doc.ensure_mutable()?;
        if doc.kind != DocumentKind::Sales {
            return Err(TradeError::WrongKind {
                expected: DocumentKind::Sales,
            }
            .into());
        }
        if doc.status != DocumentStatus::Quotation {
            return Err(Self::rejected(doc, "send"));
        }
        doc.status = DocumentStatus::QuotationSent;
        doc.updated_at = Utc::now();
        info!(number = %doc.number, "Quotation sent");
        self.touch();
        Ok(())
    }

    /// Confirms a draft into a sales order or purchase order.
    ///
    /// Issues a fresh order number and keeps the drafting number. No
    /// stock or ledger effect by itself; reservation is a separate,
    /// explicit move.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the document is in a drafting
    /// stage, and `ReadOnlyHistorical` for migrated documents.
    pub fn confirm(&mut self, id: DocumentId) -> Result<(), EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if !doc.status.is_draft_stage() {
            return Err(Self::rejected(doc, "confirm"));
        }
        let kind = doc.kind;
        let order_number = self.counters.next_order(kind);

        let doc = self.document_mut(id)?;
        doc.quotation_number = Some(std::mem::replace(&mut doc.number, order_number));
        doc.status = match kind {
            DocumentKind::Sales => DocumentStatus::SalesOrder,
            DocumentKind::Purchase => DocumentStatus::PurchaseOrder,
        };
        doc.updated_at = Utc::now();
        info!(number = %doc.number, draft = ?doc.quotation_number, "Document confirmed");
        self.touch();
        Ok(())
    }

    /// Replaces the lines of a pre-fulfillment document and recomputes
    /// its totals.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once any quantity has flowed,
    /// `ReadOnlyHistorical` for migrated documents, and line validation
    /// errors for bad input.
    pub fn update_lines(
        &mut self,
        id: DocumentId,
        lines: Vec<DraftLine>,
    ) -> Result<(), EngineError> {
        let lines = Self::build_lines(lines)?;
        let doc = self.document_mut(id)?;
        doc.ensure_mutable()?;
        if !doc.status.is_pre_fulfillment() {
            return Err(Self::rejected(doc, "edit"));
        }
        doc.totals = DocumentTotals::from_lines(&lines);
        doc.lines = lines;
        doc.updated_at = Utc::now();
        self.touch();
        Ok(())
    }

    /// Cancels a pre-fulfillment document.
    ///
    /// Payment legs already posted are never reversed; history is
    /// append-only and any collected amount stays on the party's ledger.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once any quantity has flowed and
    /// `ReadOnlyHistorical` for migrated documents.
    pub fn cancel(&mut self, id: DocumentId) -> Result<(), EngineError> {
        let doc = self.document_mut(id)?;
        doc.ensure_mutable()?;
        if !doc.status.is_pre_fulfillment() {
            return Err(Self::rejected(doc, "cancel"));
        }
        doc.status = DocumentStatus::Cancelled;
        doc.updated_at = Utc::now();
        info!(number = %doc.number, "Document cancelled");
        self.touch();
        Ok(())
    }

    /// Reserves stock against a confirmed sales order: an explicit,
    /// reversible transfer into the Booked zone remarked with the
    /// document number.
    ///
    /// # Errors
    ///
    /// Returns `WrongKind` for purchase documents, `InvalidTransition`
    /// unless the order is confirmed and undelivered quantity remains,
    /// `QuantityExceedsRemaining` when reserving more than remains to
    /// deliver, and stock errors when the source zone is short.
    pub fn reserve_stock(
        &mut self,
        id: DocumentId,
        lines: &[QuantityLine],
        from_zone: Zone,
        actor: impl Into<String>,
    ) -> Result<(), EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if doc.kind != DocumentKind::Sales {
            return Err(TradeError::WrongKind {
                expected: DocumentKind::Sales,
            }
            .into());
        }
        if doc.status.is_draft_stage() || doc.status.is_terminal() {
            return Err(Self::rejected(doc, "reserve stock for"));
        }
        let wanted = Self::aggregate(lines)?;
        for (&product_id, &qty) in &wanted {
            let line = doc
                .line(product_id)
                .ok_or(TradeError::UnknownProduct(product_id))?;
            if qty > line.remaining_to_fulfill() {
                return Err(TradeError::QuantityExceedsRemaining {
                    product_id,
                    requested: qty,
                    remaining: line.remaining_to_fulfill(),
                }
                .into());
            }
            Self::check_stock(&self.stock, product_id, from_zone, qty)?;
        }

        let number = doc.number.clone();
        let meta = MovementMeta::now(actor);
        for (&product_id, &qty) in &wanted {
            self.stock.transfer(
                product_id,
                from_zone,
                Zone::Booked,
                qty,
                Some(number.clone()),
                meta.clone(),
            )?;
        }
        self.touch();
        info!(number = %number, %from_zone, "Stock reserved");
        Ok(())
    }

    /// Releases a reservation: moves quantity out of the Booked zone
    /// back into an operable zone, remarked with the document number.
    ///
    /// # Errors
    ///
    /// Returns stock errors when the Booked zone holds less than
    /// requested.
    pub fn release_reservation(
        &mut self,
        id: DocumentId,
        lines: &[QuantityLine],
        to_zone: Zone,
        actor: impl Into<String>,
    ) -> Result<(), EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        let wanted = Self::aggregate(lines)?;
        for (&product_id, &qty) in &wanted {
            Self::check_stock(&self.stock, product_id, Zone::Booked, qty)?;
        }

        let number = doc.number.clone();
        let meta = MovementMeta::now(actor);
        for (&product_id, &qty) in &wanted {
            self.stock.transfer(
                product_id,
                Zone::Booked,
                to_zone,
                qty,
                Some(number.clone()),
                meta.clone(),
            )?;
        }
        self.touch();
        info!(number = %number, %to_zone, "Reservation released");
        Ok(())
    }

    /// Records a delivery (sales) or goods receipt (purchase) against a
    /// confirmed document.
    ///
    /// Sales deliveries draw stock from `zone`; purchase receipts flow
    /// into it. Every check runs before any stock moves, so a rejected
    /// call leaves stock and document untouched. Returns the delivery
    /// note / GRN number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the document is confirmed,
    /// `QuantityExceedsRemaining` when a line would exceed its ordered
    /// quantity, `InsufficientStock` when a sales delivery exceeds the
    /// zone, and `ReadOnlyHistorical` for migrated documents.
    pub fn record_fulfillment(
        &mut self,
        id: DocumentId,
        lines: &[QuantityLine],
        zone: Zone,
        date: NaiveDate,
        actor: impl Into<String>,
    ) -> Result<String, EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if doc.status.is_draft_stage() || doc.status.is_terminal() {
            let err = Self::rejected(doc, "fulfill");
            warn!(number = %doc.number, status = %doc.status, "Fulfillment rejected");
            return Err(err);
        }
        if !zone.is_operable() {
            return Err(StockError::ZoneNotOperable(zone).into());
        }

        let wanted = Self::aggregate(lines)?;
        for (&product_id, &qty) in &wanted {
            let line = doc
                .line(product_id)
                .ok_or(TradeError::UnknownProduct(product_id))?;
            if qty > line.remaining_to_fulfill() {
                return Err(TradeError::QuantityExceedsRemaining {
                    product_id,
                    requested: qty,
                    remaining: line.remaining_to_fulfill(),
                }
                .into());
            }
            if doc.kind == DocumentKind::Sales {
                Self::check_stock(&self.stock, product_id, zone, qty)?;
            }
        }

        // All checks passed; apply.
        let kind = doc.kind;
        let counterparty = doc.party.name.clone();
        let number = self.counters.next_fulfillment(kind);
        let meta = MovementMeta::now(actor);
        for (&product_id, &qty) in &wanted {
            match kind {
                DocumentKind::Sales => self.stock.deliver(
                    product_id,
                    zone,
                    qty,
                    counterparty.clone(),
                    Some(number.clone()),
                    meta.clone(),
                )?,
                DocumentKind::Purchase => self.stock.receive(
                    product_id,
                    zone,
                    qty,
                    counterparty.clone(),
                    Some(number.clone()),
                    meta.clone(),
                )?,
            };
        }

        let doc = self.document_mut(id)?;
        for (&product_id, &qty) in &wanted {
            if let Some(line) = doc.line_mut(product_id) {
                line.fulfilled += qty;
            }
        }
        doc.status = derive_status(doc.kind, doc.status, &doc.lines);
        doc.fulfillments.push(FulfillmentRecord {
            number: number.clone(),
            date,
            zone,
            lines: wanted
                .into_iter()
                .map(|(product_id, qty)| QuantityLine { product_id, qty })
                .collect(),
            recorded_at: Utc::now(),
        });
        doc.updated_at = Utc::now();
        info!(number = %doc.number, fulfillment = %number, status = %doc.status, "Fulfillment recorded");
        self.touch();
        Ok(number)
    }

    /// Settles fulfilled quantities: raises an invoice (sales) or books
    /// a bill (purchase) and posts the single party leg that recognizes
    /// the revenue or cost. Returns the invoice / bill number.
    ///
    /// # Errors
    ///
    /// Returns `QuantityExceedsRemaining` when a line would exceed its
    /// fulfilled quantity, `InvalidTransition` in drafting or terminal
    /// states, and `ReadOnlyHistorical` for migrated documents.
    pub fn settle(
        &mut self,
        id: DocumentId,
        lines: &[QuantityLine],
        date: NaiveDate,
    ) -> Result<String, EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if doc.status.is_draft_stage() || doc.status.is_terminal() {
            return Err(Self::rejected(doc, "settle"));
        }

        let wanted = Self::aggregate(lines)?;
        let mut amount = Decimal::ZERO;
        for (&product_id, &qty) in &wanted {
            let line = doc
                .line(product_id)
                .ok_or(TradeError::UnknownProduct(product_id))?;
            if qty > line.remaining_to_settle() {
                return Err(TradeError::QuantityExceedsRemaining {
                    product_id,
                    requested: qty,
                    remaining: line.remaining_to_settle(),
                }
                .into());
            }
            amount += line.value_of(qty);
        }

        let kind = doc.kind;
        let party_id = doc.party.id;
        let party_name = doc.party.name.clone();
        let number = self.counters.next_settlement(kind);
        let leg = match kind {
            DocumentKind::Sales => {
                LegDraft::party(party_id, Side::Debit, amount, EntryType::Revenue, date)
                    .with_description(format!("Invoice {number} to {party_name}"))
            }
            DocumentKind::Purchase => {
                LegDraft::party(party_id, Side::Credit, amount, EntryType::Cost, date)
                    .with_description(format!("Bill {number} from {party_name}"))
            }
        };
        let entry_id = self
            .ledger
            .post_single(leg.for_document(id).with_reference(number.clone()))?;

        let doc = self.document_mut(id)?;
        for (&product_id, &qty) in &wanted {
            if let Some(line) = doc.line_mut(product_id) {
                line.settled += qty;
            }
        }
        doc.status = derive_status(doc.kind, doc.status, &doc.lines);
        doc.settlements.push(SettlementRecord {
            number: number.clone(),
            date,
            amount,
            lines: wanted
                .into_iter()
                .map(|(product_id, qty)| QuantityLine { product_id, qty })
                .collect(),
            entry_id,
            recorded_at: Utc::now(),
        });
        doc.updated_at = Utc::now();
        info!(number = %doc.number, settlement = %number, %amount, status = %doc.status, "Settlement recorded");
        self.touch();
        Ok(number)
    }

    /// Collects a customer payment against a sales document.
    ///
    /// Posts the two-leg pair (debit account, credit customer), applies
    /// the amount to `amount_paid` and re-derives the payment status.
    ///
    /// # Errors
    ///
    /// Returns `WrongKind` for purchase documents,
    /// `PaymentExceedsOutstanding` when the amount exceeds what is owed,
    /// and ledger errors for bad amounts or unknown accounts.
    pub fn collect_payment(
        &mut self,
        id: DocumentId,
        amount: Decimal,
        account_id: AccountId,
        reference: impl Into<String>,
        date: NaiveDate,
    ) -> Result<(EntryId, EntryId), EngineError> {
        self.apply_payment(id, DocumentKind::Sales, amount, account_id, reference.into(), date)
    }

    /// Pays a vendor against a purchase document.
    ///
    /// Posts the two-leg pair (credit account, debit supplier), applies
    /// the amount to `amount_paid` and re-derives the payment status.
    ///
    /// # Errors
    ///
    /// Returns `WrongKind` for sales documents, `PaymentExceedsOutstanding`
    /// when the amount exceeds what is owed, and ledger errors for bad
    /// amounts or unknown accounts.
    pub fn pay_vendor(
        &mut self,
        id: DocumentId,
        amount: Decimal,
        account_id: AccountId,
        reference: impl Into<String>,
        date: NaiveDate,
    ) -> Result<(EntryId, EntryId), EngineError> {
        self.apply_payment(
            id,
            DocumentKind::Purchase,
            amount,
            account_id,
            reference.into(),
            date,
        )
    }

    fn apply_payment(
        &mut self,
        id: DocumentId,
        expected_kind: DocumentKind,
        amount: Decimal,
        account_id: AccountId,
        reference: String,
        date: NaiveDate,
    ) -> Result<(EntryId, EntryId), EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if doc.kind != expected_kind {
            return Err(TradeError::WrongKind {
                expected: expected_kind,
            }
            .into());
        }
        if doc.status == DocumentStatus::Cancelled {
            return Err(Self::rejected(doc, "record a payment on"));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount).into());
        }
        let outstanding = doc.outstanding();
        if amount > outstanding {
            return Err(TradeError::PaymentExceedsOutstanding {
                requested: amount,
                outstanding,
            }
            .into());
        }

        let party_id = doc.party.id;
        let party_name = doc.party.name.clone();
        let number = doc.number.clone();
        let (entry_type, account_side, party_side) = match expected_kind {
            DocumentKind::Sales => (EntryType::CustomerPayment, Side::Debit, Side::Credit),
            DocumentKind::Purchase => (EntryType::VendorPayment, Side::Credit, Side::Debit),
        };
        let legs = self.ledger.post_pair(
            LegDraft::treasury(account_id, account_side, amount, entry_type, date)
                .for_document(id)
                .with_reference(reference.clone())
                .with_description(format!("Payment against {number} ({party_name})")),
            LegDraft::party(party_id, party_side, amount, entry_type, date)
                .for_document(id)
                .with_reference(reference)
                .with_description(format!("Payment against {number}")),
        )?;

        let doc = self.document_mut(id)?;
        doc.amount_paid += amount;
        doc.payment_status = derive_payment_status(doc.amount_paid, doc.totals.grand_total);
        doc.updated_at = Utc::now();
        info!(number = %doc.number, %amount, payment_status = ?doc.payment_status, "Payment recorded");
        self.touch();
        Ok(legs)
    }

    /// Records an advance from or to a party, independent of any
    /// document.
    ///
    /// The two-leg pair moves the party and account balances at once;
    /// document `amount_paid` is only touched later through
    /// [`TenantBooks::reconcile_advance`].
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` for an unknown party and ledger errors
    /// for bad amounts or unknown accounts.
    pub fn record_advance(
        &mut self,
        party_id: PartyId,
        amount: Decimal,
        account_id: AccountId,
        reference: impl Into<String>,
        date: NaiveDate,
        directory: &dyn PartyDirectory,
    ) -> Result<(EntryId, EntryId), EngineError> {
        let profile = self.party_profile(party_id, directory)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount).into());
        }

        let reference = reference.into();
        let (entry_type, account_side, party_side) = match profile.kind {
            crate::ledger::PartyKind::Customer => {
                (EntryType::CustomerPayment, Side::Debit, Side::Credit)
            }
            crate::ledger::PartyKind::Supplier => {
                (EntryType::VendorPayment, Side::Credit, Side::Debit)
            }
        };
        let legs = self.ledger.post_pair(
            LegDraft::treasury(account_id, account_side, amount, entry_type, date)
                .with_reference(reference.clone())
                .with_description(format!("Advance ({})", profile.name)),
            LegDraft::party(party_id, party_side, amount, entry_type, date)
                .with_reference(reference)
                .with_description("Advance".to_string()),
        )?;
        self.touch();
        info!(party = %profile.name, %amount, "Advance recorded");
        Ok(legs)
    }

    /// Consumes an advance against a document: re-tags the advance's
    /// party leg with the document id and applies the amount to
    /// `amount_paid`. Posts no legs, so party and account balances are
    /// identical before and after.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAdvance` unless the entry is an unconsumed party
    /// payment leg of this document's party, `PaymentExceedsOutstanding`
    /// when the amount exceeds what is owed, and `InvalidAmount` when it
    /// exceeds the advance itself.
    pub fn reconcile_advance(
        &mut self,
        id: DocumentId,
        entry_id: EntryId,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        let doc = self
            .documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))?;
        doc.ensure_mutable()?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount).into());
        }
        let outstanding = doc.outstanding();
        if amount > outstanding {
            return Err(TradeError::PaymentExceedsOutstanding {
                requested: amount,
                outstanding,
            }
            .into());
        }
        let entry = self.ledger.entry(entry_id)?;
        if entry.party_id != Some(doc.party.id) {
            return Err(LedgerError::NotAnAdvance(entry_id).into());
        }
        let advance_amount = entry.debit.max(entry.credit);
        if amount > advance_amount {
            return Err(LedgerError::InvalidAmount(amount).into());
        }

        self.ledger.retag_advance(entry_id, id)?;
        let doc = self.document_mut(id)?;
        doc.amount_paid += amount;
        doc.payment_status = derive_payment_status(doc.amount_paid, doc.totals.grand_total);
        doc.updated_at = Utc::now();
        info!(number = %doc.number, %amount, "Advance reconciled");
        self.touch();
        Ok(())
    }

    // ========================================================================
    // Document-less postings
    // ========================================================================

    /// Records a walk-in cash sale without a document: a single treasury
    /// debit leg of type Revenue.
    ///
    /// # Errors
    ///
    /// Returns ledger errors for bad amounts or unknown accounts.
    pub fn record_cash_sale(
        &mut self,
        account_id: AccountId,
        amount: Decimal,
        reference: impl Into<String>,
        date: NaiveDate,
    ) -> Result<EntryId, EngineError> {
        let entry = self.ledger.post_single(
            LegDraft::treasury(account_id, Side::Debit, amount, EntryType::Revenue, date)
                .with_reference(reference)
                .with_description("Cash sale".to_string()),
        )?;
        self.touch();
        info!(%amount, "Cash sale recorded");
        Ok(entry)
    }

    /// Records an operating expense: an expense record plus a single
    /// treasury credit leg of type Expense.
    ///
    /// # Errors
    ///
    /// Returns ledger errors for bad amounts or unknown accounts.
    pub fn record_expense(
        &mut self,
        category: impl Into<String>,
        amount: Decimal,
        account_id: AccountId,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Result<ExpenseId, EngineError> {
        let category = category.into();
        let description = description.into();
        self.ledger.post_single(
            LegDraft::treasury(account_id, Side::Credit, amount, EntryType::Expense, date)
                .with_reference(category.clone())
                .with_description(description.clone()),
        )?;

        let record = ExpenseRecord {
            id: ExpenseId::new(),
            tenant_id: self.tenant_id,
            date,
            category,
            amount,
            account_id,
            description,
        };
        let id = record.id;
        self.expenses.push(record);
        self.touch();
        info!(%amount, "Expense recorded");
        Ok(id)
    }

    // ========================================================================
    // Migration
    // ========================================================================

    /// Imports a document from a previous system as read-only history.
    ///
    /// Quantities are accepted as given (the triple invariant is still
    /// validated), migrated purchase goods are received into the archive
    /// zone, and no ledger legs are posted. Every later mutation fails
    /// with `ReadOnlyHistorical`.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` for an unknown party and validation
    /// errors for lines violating `0 ≤ settled ≤ fulfilled ≤ ordered`.
    pub fn import_historical(
        &mut self,
        import: HistoricalDocument,
        directory: &dyn PartyDirectory,
        actor: impl Into<String>,
    ) -> Result<DocumentId, EngineError> {
        let profile = self.party_profile(import.party_id, directory)?;
        if import.lines.is_empty() {
            return Err(TradeError::EmptyLines.into());
        }

        let mut lines = Vec::with_capacity(import.lines.len());
        for input in &import.lines {
            let mut line = LineItem::new(
                input.product.clone(),
                input.ordered,
                input.unit_price,
                input.discount_pct,
                input.tax_pct,
            )?;
            if input.fulfilled < 0 || input.fulfilled > input.ordered {
                return Err(TradeError::QuantityExceedsRemaining {
                    product_id: input.product.id,
                    requested: input.fulfilled,
                    remaining: input.ordered,
                }
                .into());
            }
            if input.settled < 0 || input.settled > input.fulfilled {
                return Err(TradeError::QuantityExceedsRemaining {
                    product_id: input.product.id,
                    requested: input.settled,
                    remaining: input.fulfilled,
                }
                .into());
            }
            line.fulfilled = input.fulfilled;
            line.settled = input.settled;
            lines.push(line);
        }
        let totals = DocumentTotals::from_lines(&lines);

        // Migrated purchase goods are placed in the archive so they stay
        // auditable without entering operable totals; migrated sales
        // deliveries left the building before migration and are
        // record-only.
        if import.kind == DocumentKind::Purchase {
            let meta = MovementMeta::now(actor);
            for line in &lines {
                if line.fulfilled > 0 {
                    self.stock.archive_receive(
                        line.product.id,
                        line.fulfilled,
                        profile.name.clone(),
                        Some(import.number.clone()),
                        meta.clone(),
                    )?;
                }
            }
        }

        let now = Utc::now();
        let document = TradeDocument {
            id: DocumentId::new(),
            tenant_id: self.tenant_id,
            number: import.number,
            quotation_number: None,
            kind: import.kind,
            issue_date: import.issue_date,
            expected_date: None,
            party: PartySnapshot {
                id: profile.id,
                name: profile.name,
            },
            zone: Zone::Archive,
            amount_paid: import.amount_paid,
            payment_status: derive_payment_status(import.amount_paid, totals.grand_total),
            totals,
            lines,
            status: DocumentStatus::Migrated,
            source: DocumentSource::Migration,
            fulfillments: Vec::new(),
            settlements: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = document.id;
        info!(number = %document.number, "Historical document imported");
        self.documents.insert(id, document);
        self.touch();
        Ok(id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn document_mut(&mut self, id: DocumentId) -> Result<&mut TradeDocument, EngineError> {
        self.documents
            .get_mut(&id)
            .ok_or(EngineError::DocumentNotFound(id))
    }

    fn rejected(doc: &TradeDocument, operation: &'static str) -> EngineError {
        TradeError::InvalidTransition {
            status: doc.status,
            operation,
        }
        .into()
    }

    /// Validates draft lines and builds line items.
    fn build_lines(lines: Vec<DraftLine>) -> Result<Vec<LineItem>, EngineError> {
        if lines.is_empty() {
            return Err(TradeError::EmptyLines.into());
        }
        let mut built: Vec<LineItem> = Vec::with_capacity(lines.len());
        for input in lines {
            if built.iter().any(|l| l.product.id == input.product.id) {
                return Err(TradeError::DuplicateProduct(input.product.id).into());
            }
            built.push(LineItem::new(
                input.product,
                input.qty,
                input.unit_price,
                input.discount_pct,
                input.tax_pct,
            )?);
        }
        Ok(built)
    }

    /// Validates quantity lines and aggregates them per product.
    fn aggregate(lines: &[QuantityLine]) -> Result<BTreeMap<ProductId, i64>, EngineError> {
        if lines.is_empty() {
            return Err(TradeError::EmptyLines.into());
        }
        let mut wanted: BTreeMap<ProductId, i64> = BTreeMap::new();
        for line in lines {
            if line.qty <= 0 {
                return Err(TradeError::InvalidQuantity(line.qty).into());
            }
            *wanted.entry(line.product_id).or_insert(0) += line.qty;
        }
        Ok(wanted)
    }

    fn check_stock(
        stock: &StockLedger,
        product_id: ProductId,
        zone: Zone,
        qty: i64,
    ) -> Result<(), EngineError> {
        let available = stock.on_hand(product_id, zone);
        if available < qty {
            return Err(StockError::InsufficientStock {
                product_id,
                zone,
                available,
                requested: qty,
            }
            .into());
        }
        Ok(())
    }
}

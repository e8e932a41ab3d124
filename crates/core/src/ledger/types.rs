//! Financial ledger domain types.
//!
//! The ledger is an append-only store of legs. A leg is one side of a
//! double-entry posting: a single row carrying either a debit or a credit,
//! against exactly one of a financial account (treasury leg) or a
//! counterparty (party leg). Money movements are always represented as a
//! pair of legs whose debits and credits sum to zero across the pair.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sauda_shared::types::{AccountId, DocumentId, EntryId, PartyId, TenantId};
use serde::{Deserialize, Serialize};

/// Kind of financial account (treasury bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Physical cash drawer.
    Cash,
    /// Bank account.
    Bank,
    /// UPI wallet.
    Upi,
    /// Card settlement account.
    Card,
    /// Cheques in hand.
    Cheque,
}

impl AccountKind {
    /// Returns the display name of the account kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Upi => "upi",
            Self::Card => "card",
            Self::Cheque => "cheque",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial account holding tenant money.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Tenant this account belongs to.
    pub tenant_id: TenantId,
    /// Display name ("Cash Main", "HDFC Current").
    pub name: String,
    /// Treasury bucket kind.
    pub kind: AccountKind,
    /// Balance carried in from before the ledger's first entry.
    pub opening_balance: Decimal,
}

/// Counterparty kind, which fixes the balance sign convention.
///
/// Receivables (customers) are debit-normal: balance = opening +
/// Σ(debit − credit). Payables (suppliers) are credit-normal: balance =
/// opening + Σ(credit − debit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// Customer (receivable, debit-normal).
    Customer,
    /// Supplier (payable, credit-normal).
    Supplier,
}

impl PartyKind {
    /// Balance change contributed by one leg under this kind's convention.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Customer => debit - credit,
            Self::Supplier => credit - debit,
        }
    }
}

/// Business classification of a ledger leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Sales revenue recognized against a customer (invoice).
    Revenue,
    /// Purchase cost recognized against a supplier (bill).
    Cost,
    /// Money received from a customer (payment or advance).
    CustomerPayment,
    /// Money paid to a supplier (payment or advance).
    VendorPayment,
    /// Operating expense paid out of an account.
    Expense,
    /// Internal transfer between two accounts.
    FundTransfer,
}

impl EntryType {
    /// Returns true if a party leg of this type marks the party as a
    /// receivable (customer side).
    #[must_use]
    pub fn marks_receivable(self) -> bool {
        matches!(self, Self::Revenue | Self::CustomerPayment)
    }

    /// Returns true if a party leg of this type marks the party as a
    /// payable (supplier side).
    #[must_use]
    pub fn marks_payable(self) -> bool {
        matches!(self, Self::Cost | Self::VendorPayment)
    }
}

/// One side a leg can fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit (left) side.
    Debit,
    /// Credit (right) side.
    Credit,
}

/// A leg waiting to be appended to the ledger.
///
/// Built through [`LegDraft::treasury`] or [`LegDraft::party`] so a draft
/// can never carry both an account and a party reference.
#[derive(Debug, Clone)]
pub struct LegDraft {
    /// Business date of the movement.
    pub date: NaiveDate,
    /// Business classification.
    pub entry_type: EntryType,
    /// Which side the amount falls on.
    pub side: Side,
    /// Amount (must be positive).
    pub amount: Decimal,
    /// Treasury account, if this is a treasury leg.
    pub account_id: Option<AccountId>,
    /// Counterparty, if this is a party leg.
    pub party_id: Option<PartyId>,
    /// Originating trade document, if any.
    pub transaction_id: Option<DocumentId>,
    /// External reference (invoice number, UTR, cheque number).
    pub reference: String,
    /// Human-readable description.
    pub description: String,
}

impl LegDraft {
    /// Creates a treasury leg draft against a financial account.
    #[must_use]
    pub fn treasury(
        account_id: AccountId,
        side: Side,
        amount: Decimal,
        entry_type: EntryType,
        date: NaiveDate,
    ) -> Self {
        Self {
            date,
            entry_type,
            side,
            amount,
            account_id: Some(account_id),
            party_id: None,
            transaction_id: None,
            reference: String::new(),
            description: String::new(),
        }
    }

    /// Creates a party leg draft against a counterparty.
    #[must_use]
    pub fn party(
        party_id: PartyId,
        side: Side,
        amount: Decimal,
        entry_type: EntryType,
        date: NaiveDate,
    ) -> Self {
        Self {
            date,
            entry_type,
            side,
            amount,
            account_id: None,
            party_id: Some(party_id),
            transaction_id: None,
            reference: String::new(),
            description: String::new(),
        }
    }

    /// Tags the draft with the originating trade document.
    #[must_use]
    pub fn for_document(mut self, document_id: DocumentId) -> Self {
        self.transaction_id = Some(document_id);
        self
    }

    /// Sets the external reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Debit amount of this draft (zero for credit legs).
    #[must_use]
    pub fn debit(&self) -> Decimal {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => Decimal::ZERO,
        }
    }

    /// Credit amount of this draft (zero for debit legs).
    #[must_use]
    pub fn credit(&self) -> Decimal {
        match self.side {
            Side::Credit => self.amount,
            Side::Debit => Decimal::ZERO,
        }
    }
}

/// An appended ledger leg (immutable except for the cosmetic
/// reconciliation flag and the advance re-tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Tenant this leg belongs to.
    pub tenant_id: TenantId,
    /// Business date of the movement.
    pub date: NaiveDate,
    /// Business classification.
    pub entry_type: EntryType,
    /// Debit amount (zero for credit legs).
    pub debit: Decimal,
    /// Credit amount (zero for debit legs).
    pub credit: Decimal,
    /// Treasury account, if this is a treasury leg.
    pub account_id: Option<AccountId>,
    /// Counterparty, if this is a party leg.
    pub party_id: Option<PartyId>,
    /// Originating trade document, if any.
    pub transaction_id: Option<DocumentId>,
    /// External reference.
    pub reference: String,
    /// Human-readable description.
    pub description: String,
    /// Whether a human has cross-checked this leg against an external
    /// statement. Cosmetic only; never affects balances.
    pub reconciled: bool,
    /// When the leg was appended.
    pub posted_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Net signed amount of the leg (debit − credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true if this is a treasury leg.
    #[must_use]
    pub fn is_treasury(&self) -> bool {
        self.account_id.is_some()
    }
}

/// A ledger row annotated with a running balance.
///
/// Rows accumulate oldest-first in time; display order reverses them so
/// the most recent row comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    /// The underlying leg.
    pub entry: LedgerEntry,
    /// Balance after this leg, accumulated forward in time.
    pub running_balance: Decimal,
}

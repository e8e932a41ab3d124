//! Double-entry financial ledger.
//!
//! This module implements the money side of the engine:
//! - Financial accounts (cash, bank, UPI, card, cheque) with opening balances
//! - Append-only ledger legs against accounts or counterparties
//! - Balanced two-leg postings enforced at the ledger boundary
//! - Incrementally-cached balances with a full-scan reconciliation oracle
//! - Running ledgers, fund transfers, and the reconciliation flag

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::FinancialLedger;
pub use types::{
    Account, AccountKind, EntryType, LedgerEntry, LedgerRow, LegDraft, PartyKind, Side,
};

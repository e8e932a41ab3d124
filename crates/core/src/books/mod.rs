//! Per-tenant books: the engine facade over stock, ledger and trade
//! documents, plus the collaborator contracts the surrounding
//! application implements.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::TenantBooks;
pub use types::{
    DocumentCounters, DraftLine, ExpenseRecord, HistoricalDocument, HistoricalLine,
    InMemoryPartyDirectory, PartyDirectory, PartyProfile, TenantResolver,
};

//! Engine-wide error facade.

use sauda_shared::types::{DocumentId, EntryId, PartyId};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::snapshot::SnapshotError;
use crate::stock::StockError;
use crate::trade::TradeError;

/// Umbrella error returned by the engine facade.
///
/// Flattens the per-module errors and adds the facade-level lookups.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Warehouse stock error.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Financial ledger error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Trade document error.
    #[error(transparent)]
    Trade(#[from] TradeError),

    /// Snapshot persistence error.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Trade document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Party not known to the directory.
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(EntryId),
}

impl EngineError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Stock(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Trade(e) => e.error_code(),
            Self::Snapshot(e) => e.error_code(),
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
        }
    }
}

//! Ledger error types.

use rust_decimal::Decimal;
use sauda_shared::types::{AccountId, EntryId};
use thiserror::Error;

/// Errors that can occur during financial ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Leg Validation Errors ==========
    /// Monetary amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// A leg must reference exactly one of an account or a party.
    ///
    /// A leg carrying both would double-count the same money in account
    /// and party balances; a leg carrying neither belongs to nothing.
    #[error("A leg must reference exactly one of an account or a party")]
    InvalidLegTarget,

    /// The two legs of a pair do not balance.
    #[error("Legs do not balance. Debit: {debit}, Credit: {credit}")]
    UnbalancedPair {
        /// Total debit across the pair.
        debit: Decimal,
        /// Total credit across the pair.
        credit: Decimal,
    },

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(EntryId),

    // ========== Fund Transfer Errors ==========
    /// Source account balance is lower than the requested transfer.
    #[error(
        "Insufficient balance in account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientBalance {
        /// The source account.
        account_id: AccountId,
        /// Its current balance.
        balance: Decimal,
        /// The requested amount.
        requested: Decimal,
    },

    /// Source and destination accounts must differ.
    #[error("Source and destination accounts must differ")]
    SameAccount,

    // ========== Advance Reconciliation Errors ==========
    /// The entry being reconciled is not an open party advance.
    #[error("Entry {0} is not an unconsumed party advance")]
    NotAnAdvance(EntryId),
}

impl LedgerError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidLegTarget => "INVALID_LEG_TARGET",
            Self::UnbalancedPair { .. } => "UNBALANCED_PAIR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::NotAnAdvance(_) => "NOT_AN_ADVANCE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InvalidAmount(dec!(-5)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            LedgerError::UnbalancedPair {
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED_PAIR"
        );
        assert_eq!(LedgerError::SameAccount.error_code(), "SAME_ACCOUNT");
    }

    #[test]
    fn test_error_display_names_constraint() {
        let err = LedgerError::InsufficientBalance {
            account_id: AccountId::from_uuid(uuid::Uuid::nil()),
            balance: dec!(30),
            requested: dec!(100),
        };
        assert!(err.to_string().contains("balance 30"));
        assert!(err.to_string().contains("requested 100"));
    }
}

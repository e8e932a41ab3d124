//! Trade document error types.

use rust_decimal::Decimal;
use sauda_shared::types::ProductId;
use thiserror::Error;

use super::status::DocumentStatus;

/// Errors that can occur during trade document operations.
#[derive(Debug, Error)]
pub enum TradeError {
    // ========== Line Validation Errors ==========
    /// A document must carry at least one line item.
    #[error("A document must carry at least one line item")]
    EmptyLines,

    /// Quantity must be positive.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Monetary amount must not be negative.
    #[error("Amount must not be negative, got {0}")]
    InvalidAmount(Decimal),

    /// Percentage must lie between 0 and 100.
    #[error("Percentage must lie between 0 and 100, got {0}")]
    InvalidPercentage(Decimal),

    /// The same product appears on more than one line.
    #[error("Product {0} appears on more than one line")]
    DuplicateProduct(ProductId),

    /// The referenced product has no line on this document.
    #[error("Product {0} has no line on this document")]
    UnknownProduct(ProductId),

    // ========== Quantity Flow Errors ==========
    /// Requested quantity would exceed what remains to fulfill or settle.
    #[error(
        "Quantity for product {product_id} exceeds what remains: requested {requested}, remaining {remaining}"
    )]
    QuantityExceedsRemaining {
        /// The line's product.
        product_id: ProductId,
        /// Units requested.
        requested: i64,
        /// Units still available to flow.
        remaining: i64,
    },

    // ========== Lifecycle Errors ==========
    /// Operation is not valid in the document's current status.
    #[error("Cannot {operation} a document in status {status}")]
    InvalidTransition {
        /// The document's current status.
        status: DocumentStatus,
        /// The attempted operation.
        operation: &'static str,
    },

    /// Operation applies to the other document kind.
    #[error("Operation applies only to {expected} documents")]
    WrongKind {
        /// The kind the operation is defined for.
        expected: super::types::DocumentKind,
    },

    /// Migrated documents are read-only history.
    #[error("Document is migrated history and is read-only")]
    ReadOnlyHistorical,

    // ========== Payment Errors ==========
    /// Payment would exceed the document's outstanding balance.
    #[error("Payment exceeds outstanding balance: requested {requested}, outstanding {outstanding}")]
    PaymentExceedsOutstanding {
        /// The requested payment amount.
        requested: Decimal,
        /// The amount still owed on the document.
        outstanding: Decimal,
    },
}

impl TradeError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLines => "EMPTY_LINES",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidPercentage(_) => "INVALID_PERCENTAGE",
            Self::DuplicateProduct(_) => "DUPLICATE_PRODUCT",
            Self::UnknownProduct(_) => "UNKNOWN_PRODUCT",
            Self::QuantityExceedsRemaining { .. } => "QUANTITY_EXCEEDS_REMAINING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::WrongKind { .. } => "WRONG_KIND",
            Self::ReadOnlyHistorical => "READ_ONLY_HISTORICAL",
            Self::PaymentExceedsOutstanding { .. } => "PAYMENT_EXCEEDS_OUTSTANDING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(TradeError::EmptyLines.error_code(), "EMPTY_LINES");
        assert_eq!(
            TradeError::ReadOnlyHistorical.error_code(),
            "READ_ONLY_HISTORICAL"
        );
        assert_eq!(
            TradeError::PaymentExceedsOutstanding {
                requested: dec!(100),
                outstanding: dec!(50),
            }
            .error_code(),
            "PAYMENT_EXCEEDS_OUTSTANDING"
        );
    }

    #[test]
    fn test_transition_error_names_operation() {
        let err = TradeError::InvalidTransition {
            status: DocumentStatus::Cancelled,
            operation: "fulfill",
        };
        assert_eq!(err.to_string(), "Cannot fulfill a document in status cancelled");
    }
}

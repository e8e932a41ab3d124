//! Trade document lifecycle types.
//!
//! Sales and purchase documents share one design: line items carrying an
//! ordered/fulfilled/settled quantity triple, totals recomputed from the
//! lines, and a lifecycle status derived from the aggregate quantities.
//! The lifecycle operations themselves live on the engine facade in
//! [`crate::books`], where stock and ledger side effects are wired in.

pub mod error;
pub mod status;
pub mod types;

pub use error::TradeError;
pub use status::{DocumentStatus, PaymentStatus, derive_payment_status, derive_status};
pub use types::{
    DocumentKind, DocumentSource, DocumentTotals, FulfillmentRecord, LineItem, PartySnapshot,
    ProductSnapshot, QuantityLine, SettlementRecord, TradeDocument,
};

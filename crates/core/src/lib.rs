//! Core business logic for Sauda.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `books` - Per-tenant state container and the engine facade
//! - `trade` - Trade document lifecycle (quotations through billing)
//! - `stock` - Multi-zone warehouse stock ledger
//! - `ledger` - Double-entry financial ledger
//! - `reports` - Ageing, cash flow, day book, profit and loss, brand sales
//! - `snapshot` - Tenant snapshot persistence over OpenDAL

pub mod books;
pub mod error;
pub mod ledger;
pub mod reports;
pub mod snapshot;
pub mod stock;
pub mod trade;

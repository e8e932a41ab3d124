//! Shared types and configuration for Sauda.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Monetary rounding helpers with decimal precision
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;

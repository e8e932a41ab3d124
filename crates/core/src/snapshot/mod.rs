//! Tenant snapshot persistence: whole-books JSON blobs behind an
//! OpenDAL operator (S3, local filesystem, or in-process memory).

mod config;
mod error;
mod service;

pub use config::SnapshotProvider;
pub use error::SnapshotError;
pub use service::SnapshotStore;

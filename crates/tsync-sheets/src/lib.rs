//! Google Sheets REST API client.
//!
//! This crate provides:
//! - Service account authentication via gcp_auth, with a token cache
//! - Value reads and atomic batch writes with retry and metrics
//! - A1 range helpers
//! - The queue table abstraction and its worksheet-backed implementation

pub mod a1;
pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod table;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use client::{token_source_from_env, SheetsClient, SheetsConfig};
pub use error::{SheetsError, SheetsResult};
pub use retry::RetryConfig;
pub use table::{ColumnLayout, QueueTable, SheetsQueueTable, DEFAULT_WORKSHEET};
pub use token_cache::TokenSource;
pub use types::ValueRange;

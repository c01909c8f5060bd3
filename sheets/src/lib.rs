//! Client for appending rows to a Google Sheets spreadsheet with
//! service-account credentials.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod metrics_defs;
pub mod types;

#[cfg(test)]
mod testutils;

pub use client::{SheetsClient, Spreadsheet};
pub use config::{Config, CredentialSource};
pub use credentials::ServiceAccountKey;
pub use errors::{CredentialsError, SheetsError};
pub use types::{AppendedRange, CellValue};

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the road accident CSV into an immutable in-memory record store.
//!
//! Loading happens once per session: [`loader`] reads and inspects the
//! raw rows, [`derive`] computes the date, `date_str` and `total_victims`
//! columns, and [`store::Dataset`] holds the result read-only for every
//! later filter and aggregation pass.

pub mod derive;
pub mod loader;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::{DatasetInspection, REQUIRED_COLUMNS};
pub use store::Dataset;

/// Errors that can occur while loading the accident dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The CSV file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV could not be read (bad encoding, unreadable header, etc.).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks columns every record needs.
    #[error("Missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        /// The required columns that were not found.
        columns: Vec<String>,
    },

    /// A data row could not be converted into an accident record.
    #[error("Malformed row at line {line}: {source}")]
    Row {
        /// 1-based line number in the file.
        line: u64,
        /// Underlying deserialization error.
        source: csv::Error,
    },
}

//! The session's read-only record store.

use std::time::Instant;

use accident_map_accident_models::{Accident, AccidentRecord};
use accident_map_config::DatasetConfig;

use crate::IngestError;
use crate::derive::derive_all;
use crate::loader::{DatasetInspection, LoadedCsv, load_accidents};

/// Derived accidents for one session plus what was learned while loading
/// them.
///
/// Built once and then only read. Filtering and aggregation borrow
/// [`Dataset::accidents`] and produce new views; nothing writes back.
#[derive(Debug, Clone)]
pub struct Dataset {
    accidents: Vec<Accident>,
    inspection: DatasetInspection,
    year: i32,
    undated: usize,
}

impl Dataset {
    /// Loads and derives the dataset described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the CSV cannot be loaded.
    pub fn load(config: &DatasetConfig) -> Result<Self, IngestError> {
        let start = Instant::now();
        let LoadedCsv {
            records,
            inspection,
        } = load_accidents(&config.path)?;
        let dataset = Self::from_records(&records, inspection, config.year);

        log::info!(
            "Loaded {} accidents in {:.2}s",
            dataset.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(dataset)
    }

    /// Derives a dataset from already-parsed records.
    #[must_use]
    pub fn from_records(
        records: &[AccidentRecord],
        inspection: DatasetInspection,
        year: i32,
    ) -> Self {
        let accidents = derive_all(records, year);
        let undated = accidents.iter().filter(|a| a.date.is_none()).count();

        if undated > 0 {
            log::warn!(
                "{undated} of {} accidents have no valid {year} date and will be excluded by date filters",
                accidents.len()
            );
        }

        Self {
            accidents,
            inspection,
            year,
            undated,
        }
    }

    /// All derived accidents in file order.
    #[must_use]
    pub fn accidents(&self) -> &[Accident] {
        &self.accidents
    }

    /// Number of accidents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accidents.len()
    }

    /// Whether the dataset holds no accidents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accidents.is_empty()
    }

    /// Shape and quality summary of the source CSV.
    #[must_use]
    pub const fn inspection(&self) -> &DatasetInspection {
        &self.inspection
    }

    /// Year the dates were assembled with.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Number of accidents whose day and month do not form a valid date.
    #[must_use]
    pub const fn undated(&self) -> usize {
        self.undated
    }

    /// The first `n` accidents, for a quick look at the data.
    #[must_use]
    pub fn preview(&self, n: usize) -> &[Accident] {
        &self.accidents[..n.min(self.accidents.len())]
    }
}

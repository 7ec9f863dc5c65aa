//! CSV loader for the accident dataset.
//!
//! Reads every row as raw strings first so the dataset inspection
//! (missing cells, duplicate rows) reflects the file exactly, then
//! deserializes each row into an [`AccidentRecord`].

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use accident_map_accident_models::AccidentRecord;
use serde::{Deserialize, Serialize};

use crate::IngestError;

/// Columns every accident CSV must carry. `municipality` is optional.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "day",
    "month",
    "weekday",
    "hour",
    "latitude",
    "longitude",
    "minor_injuries_30d",
    "serious_injuries_30d",
    "fatalities_30d",
];

/// Shape and quality summary of the raw CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInspection {
    /// Header names in file order.
    pub column_names: Vec<String>,
    /// Number of columns.
    pub columns: usize,
    /// Number of data rows.
    pub rows: usize,
    /// Number of empty cells across all rows and columns.
    pub missing_values: usize,
    /// Rows identical to an earlier row (the first occurrence is not counted).
    pub duplicate_rows: usize,
}

/// The records of one CSV file plus its inspection summary.
#[derive(Debug, Clone)]
pub struct LoadedCsv {
    /// Parsed accident rows in file order.
    pub records: Vec<AccidentRecord>,
    /// Shape and quality summary.
    pub inspection: DatasetInspection,
}

/// Loads the accident CSV at `path`.
///
/// # Errors
///
/// Returns [`IngestError`] if the file is missing, lacks a required
/// column, or contains a row that cannot be parsed.
pub fn load_accidents(path: &Path) -> Result<LoadedCsv, IngestError> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Reading accidents from {}", path.display());
    read_accidents(file)
}

/// Reads accident rows from any CSV source.
///
/// # Errors
///
/// Returns [`IngestError`] if a required column is missing or a row
/// cannot be parsed.
pub fn read_accidents<R: Read>(reader: R) -> Result<LoadedCsv, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column_names: Vec<String> = headers.iter().map(str::to_owned).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !column_names.iter().any(|c| c == *required))
        .map(|c| (*c).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns { columns: missing });
    }

    let mut records = Vec::new();
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut missing_values = 0;
    let mut duplicate_rows = 0;

    for result in reader.records() {
        let row = result?;

        missing_values += row.iter().filter(|field| field.is_empty()).count();

        let fields: Vec<String> = row.iter().map(str::to_owned).collect();
        if !seen.insert(fields) {
            duplicate_rows += 1;
        }

        let line = row.position().map_or(0, csv::Position::line);
        let record: AccidentRecord = row
            .deserialize(Some(&headers))
            .map_err(|source| IngestError::Row { line, source })?;
        records.push(record);
    }

    let inspection = DatasetInspection {
        columns: column_names.len(),
        column_names,
        rows: records.len(),
        missing_values,
        duplicate_rows,
    };

    log::debug!(
        "Parsed {} rows ({} missing cells, {} duplicates)",
        inspection.rows,
        inspection.missing_values,
        inspection.duplicate_rows
    );

    Ok(LoadedCsv {
        records,
        inspection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,day,month,weekday,hour,latitude,longitude,minor_injuries_30d,serious_injuries_30d,fatalities_30d";

    #[test]
    fn reads_rows_and_counts_shape() {
        let csv = format!(
            "{HEADER}\n\
             1,5,Jan,Thursday,8,38.71,-9.13,1,0,0\n\
             2,12,Feb,Sunday,23,38.74,-9.15,0,1,1\n"
        );
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.inspection.rows, 2);
        assert_eq!(loaded.inspection.columns, 10);
        assert_eq!(loaded.inspection.missing_values, 0);
        assert_eq!(loaded.inspection.duplicate_rows, 0);

        let second = &loaded.records[1];
        assert_eq!(second.id, "2");
        assert_eq!(second.month, "Feb");
        assert_eq!(second.day, Some(12));
        assert_eq!(second.hour, Some(23));
        assert_eq!(second.fatalities_30d, Some(1));
        assert_eq!(second.municipality, None);
    }

    #[test]
    fn empty_counts_become_none_and_are_counted_missing() {
        let csv = format!("{HEADER}\n1,5,Jan,Thursday,8,38.71,-9.13,,0,\n");
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        let record = &loaded.records[0];
        assert_eq!(record.minor_injuries_30d, None);
        assert_eq!(record.serious_injuries_30d, Some(0));
        assert_eq!(record.fatalities_30d, None);
        assert_eq!(loaded.inspection.missing_values, 2);
    }

    #[test]
    fn duplicate_rows_are_counted_once_per_repeat() {
        let row = "7,1,Mar,Wednesday,10,38.7,-9.1,0,0,0";
        let csv = format!("{HEADER}\n{row}\n{row}\n{row}\n");
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.inspection.duplicate_rows, 2);
    }

    #[test]
    fn optional_municipality_column_is_read() {
        let csv = format!("{HEADER},municipality\n1,5,Jan,Thursday,8,38.71,-9.13,1,0,0,Lisboa\n");
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records[0].municipality.as_deref(), Some("Lisboa"));
        assert_eq!(loaded.inspection.columns, 11);
    }

    #[test]
    fn missing_required_column_fails() {
        let csv = "id,day,month\n1,2,Jan\n";
        let err = read_accidents(csv.as_bytes()).unwrap_err();
        match err {
            IngestError::MissingColumns { columns } => {
                assert!(columns.contains(&"weekday".to_string()));
                assert!(columns.contains(&"fatalities_30d".to_string()));
                assert!(!columns.contains(&"id".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn blank_day_and_hour_keep_the_row() {
        let csv = format!(
            "{HEADER}\n\
             1,5,Jan,Thursday,8,38.71,-9.13,1,0,0\n\
             2,,Jan,Thursday,,38.72,-9.14,0,1,0\n"
        );
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].day, None);
        assert_eq!(loaded.records[1].hour, None);
        assert_eq!(loaded.inspection.missing_values, 2);
    }

    #[test]
    fn float_formatted_day_and_hour_are_read_as_integers() {
        let csv = format!("{HEADER}\n1,5.0,Jan,Thursday,8.0,38.71,-9.13,1,0,0\n");
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records[0].day, Some(5));
        assert_eq!(loaded.records[0].hour, Some(8));
    }

    #[test]
    fn non_numeric_day_is_tolerated() {
        let csv = format!("{HEADER}\n2,five,Jan,Thursday,8,38.71,-9.13,1,0,0\n");
        let loaded = read_accidents(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records[0].day, None);
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let csv = format!(
            "{HEADER}\n\
             1,5,Jan,Thursday,8,38.71,-9.13,1,0,0\n\
             2,5,Jan,Thursday,8,north,-9.13,1,0,0\n"
        );
        let err = read_accidents(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Row { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_accidents(Path::new("/nonexistent/accidents.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}

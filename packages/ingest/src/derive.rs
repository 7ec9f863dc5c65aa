//! Derived columns computed once per load.
//!
//! Turns raw [`AccidentRecord`]s into [`Accident`]s: categorical month
//! and weekday, the calendar date for the configured year, its display
//! string, and the total number of victims. Derivation never fails as a
//! whole; a row whose day and month do not form a real date, or that has
//! no day at all, just gets a `None` date.

use accident_map_accident_models::{Accident, AccidentRecord, Month, Weekday};
use chrono::NaiveDate;

/// Display format for [`Accident::date_str`].
pub const DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Builds the date for `day` of `month` in `year`.
///
/// The day is zero-padded and joined with the month abbreviation and year
/// (`"05 Jan 2023"`) before parsing, so impossible combinations such as
/// the 31st of April come back as `None` instead of an error.
#[must_use]
pub fn parse_date(day: u8, month: Month, year: i32) -> Option<NaiveDate> {
    let text = format!("{day:02} {month} {year}");
    NaiveDate::parse_from_str(&text, "%d %b %Y").ok()
}

/// Sums the three injury/fatality counts, treating missing counts as 0.
#[must_use]
pub fn total_victims(record: &AccidentRecord) -> u32 {
    [
        record.minor_injuries_30d,
        record.serious_injuries_30d,
        record.fatalities_30d,
    ]
    .into_iter()
    .map(|count| count.unwrap_or(0))
    .fold(0, u32::saturating_add)
}

/// Derives a single accident. Does not modify the input record.
#[must_use]
pub fn derive_accident(record: &AccidentRecord, year: i32) -> Accident {
    let month: Option<Month> = record.month.parse().ok();
    let weekday: Option<Weekday> = record.weekday.parse().ok();
    let date = month
        .zip(record.day)
        .and_then(|(m, day)| parse_date(day, m, year));

    Accident {
        id: record.id.clone(),
        day: record.day,
        month,
        weekday,
        hour: record.hour,
        latitude: record.latitude,
        longitude: record.longitude,
        minor_injuries_30d: record.minor_injuries_30d,
        serious_injuries_30d: record.serious_injuries_30d,
        fatalities_30d: record.fatalities_30d,
        municipality: record.municipality.clone(),
        date,
        date_str: date.map(|d| d.format(DATE_DISPLAY_FORMAT).to_string()),
        total_victims: total_victims(record),
    }
}

/// Derives every record, preserving input order.
#[must_use]
pub fn derive_all(records: &[AccidentRecord], year: i32) -> Vec<Accident> {
    records.iter().map(|r| derive_accident(r, year)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u8, month: &str, counts: [Option<u32>; 3]) -> AccidentRecord {
        AccidentRecord {
            id: "r".to_string(),
            day: Some(day),
            month: month.to_string(),
            weekday: "Monday".to_string(),
            hour: Some(9),
            latitude: 38.7,
            longitude: -9.1,
            minor_injuries_30d: counts[0],
            serious_injuries_30d: counts[1],
            fatalities_30d: counts[2],
            municipality: None,
        }
    }

    #[test]
    fn builds_date_and_display_string() {
        let a = derive_accident(&record(5, "Mar", [Some(0); 3]), 2023);
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2023, 3, 5));
        assert_eq!(a.date_str.as_deref(), Some("05/03/2023"));
        assert_eq!(a.month, Some(Month::Mar));
        assert_eq!(a.weekday, Some(Weekday::Monday));
    }

    #[test]
    fn full_month_names_are_accepted() {
        let a = derive_accident(&record(1, "September", [None; 3]), 2023);
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2023, 9, 1));
    }

    #[test]
    fn impossible_dates_become_none() {
        assert_eq!(parse_date(31, Month::Apr, 2023), None);
        assert_eq!(parse_date(29, Month::Feb, 2023), None);
        assert_eq!(parse_date(0, Month::Jan, 2023), None);
        assert!(parse_date(29, Month::Feb, 2024).is_some());

        let a = derive_accident(&record(31, "Jun", [Some(1), None, None]), 2023);
        assert_eq!(a.date, None);
        assert_eq!(a.date_str, None);
        assert_eq!(a.total_victims, 1);
    }

    #[test]
    fn missing_day_keeps_the_row_without_a_date() {
        let mut r = record(1, "Jan", [Some(2), None, Some(1)]);
        r.day = None;
        let a = derive_accident(&r, 2023);
        assert_eq!(a.day, None);
        assert_eq!(a.month, Some(Month::Jan));
        assert_eq!(a.date, None);
        assert_eq!(a.date_str, None);
        assert_eq!(a.total_victims, 3);
    }

    #[test]
    fn unknown_month_yields_no_month_and_no_date() {
        let a = derive_accident(&record(3, "Brumaire", [None; 3]), 2023);
        assert_eq!(a.month, None);
        assert_eq!(a.date, None);
    }

    #[test]
    fn total_victims_sums_components_with_missing_as_zero() {
        let cases = [
            ([Some(1), Some(2), Some(3)], 6),
            ([None, Some(2), None], 2),
            ([None, None, None], 0),
            ([Some(0), Some(0), Some(4)], 4),
        ];
        for (counts, expected) in cases {
            let rec = record(1, "Jan", counts);
            let total = total_victims(&rec);
            assert_eq!(total, expected, "{counts:?}");
            for c in counts.iter().flatten() {
                assert!(total >= *c);
            }
        }
    }

    #[test]
    fn derive_all_preserves_order_and_input() {
        let records = vec![record(2, "Dec", [None; 3]), record(1, "Jan", [None; 3])];
        let before = records.clone();
        let derived = derive_all(&records, 2023);
        assert_eq!(records, before);
        assert_eq!(derived[0].month, Some(Month::Dec));
        assert_eq!(derived[1].month, Some(Month::Jan));
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Road accident record types and calendar orderings.
//!
//! This crate defines the row shape of the accident dataset as read from
//! CSV ([`AccidentRecord`]), the derived row used by every downstream
//! stage ([`Accident`]), and the categorical [`Month`] and [`Weekday`]
//! types whose `Ord` follows the calendar rather than the alphabet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Calendar month, ordered January through December.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Month {
    #[strum(to_string = "Jan", serialize = "January")]
    Jan,
    #[strum(to_string = "Feb", serialize = "February")]
    Feb,
    #[strum(to_string = "Mar", serialize = "March")]
    Mar,
    #[strum(to_string = "Apr", serialize = "April")]
    Apr,
    #[strum(to_string = "May")]
    May,
    #[strum(to_string = "Jun", serialize = "June")]
    Jun,
    #[strum(to_string = "Jul", serialize = "July")]
    Jul,
    #[strum(to_string = "Aug", serialize = "August")]
    Aug,
    #[strum(to_string = "Sep", serialize = "September", serialize = "Sept")]
    Sep,
    #[strum(to_string = "Oct", serialize = "October")]
    Oct,
    #[strum(to_string = "Nov", serialize = "November")]
    Nov,
    #[strum(to_string = "Dec", serialize = "December")]
    Dec,
}

impl Month {
    /// Returns the month number, 1 for January through 12 for December.
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Returns all months in calendar order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Jan,
            Self::Feb,
            Self::Mar,
            Self::Apr,
            Self::May,
            Self::Jun,
            Self::Jul,
            Self::Aug,
            Self::Sep,
            Self::Oct,
            Self::Nov,
            Self::Dec,
        ]
    }
}

/// Day of the week, ordered Monday through Sunday.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Weekday {
    #[strum(to_string = "Monday", serialize = "Mon")]
    Monday,
    #[strum(to_string = "Tuesday", serialize = "Tue")]
    Tuesday,
    #[strum(to_string = "Wednesday", serialize = "Wed")]
    Wednesday,
    #[strum(to_string = "Thursday", serialize = "Thu")]
    Thursday,
    #[strum(to_string = "Friday", serialize = "Fri")]
    Friday,
    #[strum(to_string = "Saturday", serialize = "Sat")]
    Saturday,
    #[strum(to_string = "Sunday", serialize = "Sun")]
    Sunday,
}

impl Weekday {
    /// Returns all weekdays in week order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }
}

/// One accident as it appears in the source CSV.
///
/// Injury counts are optional because the file may carry empty cells;
/// consumers decide how to treat them (summing treats them as zero,
/// filtering excludes them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    /// Unique accident identifier.
    pub id: String,
    /// Day of the month (1-31), `None` when the cell is blank or not a
    /// whole number.
    #[serde(deserialize_with = "lenient_u8")]
    pub day: Option<u8>,
    /// Month name as written in the file (e.g. "Jan").
    pub month: String,
    /// Weekday name as written in the file (e.g. "Monday").
    pub weekday: String,
    /// Hour of the day (0-23), `None` when the cell is blank or not a
    /// whole number.
    #[serde(deserialize_with = "lenient_u8")]
    pub hour: Option<u8>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Victims with minor injuries within 30 days.
    pub minor_injuries_30d: Option<u32>,
    /// Victims with serious injuries within 30 days.
    pub serious_injuries_30d: Option<u32>,
    /// Fatalities within 30 days.
    pub fatalities_30d: Option<u32>,
    /// Municipality, when the file carries one.
    #[serde(default)]
    pub municipality: Option<String>,
}

/// Reads a small whole number from a CSV cell.
///
/// Spreadsheet exports write integer columns with gaps as floats
/// (`5.0`), so integer-valued floats are accepted. Blank or non-numeric
/// cells become `None` instead of failing the row.
fn lenient_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_whole_u8(&raw))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_whole_u8(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<u8>() {
        return Some(n);
    }
    let float: f64 = raw.parse().ok()?;
    (float.is_finite() && float.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&float))
        .then_some(float as u8)
}

/// An accident with its derived columns.
///
/// Built once per load by the derivation stage and never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accident {
    /// Unique accident identifier.
    pub id: String,
    /// Day of the month, if the file had one.
    pub day: Option<u8>,
    /// Month, `None` when the file value is not a recognised month name.
    pub month: Option<Month>,
    /// Weekday, `None` when the file value is not a recognised weekday.
    pub weekday: Option<Weekday>,
    /// Hour of the day, if the file had one.
    pub hour: Option<u8>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Victims with minor injuries within 30 days.
    pub minor_injuries_30d: Option<u32>,
    /// Victims with serious injuries within 30 days.
    pub serious_injuries_30d: Option<u32>,
    /// Fatalities within 30 days.
    pub fatalities_30d: Option<u32>,
    /// Municipality, if known.
    pub municipality: Option<String>,
    /// Calendar date, `None` when day and month do not form a valid date.
    pub date: Option<NaiveDate>,
    /// Human-readable rendering of [`Self::date`].
    pub date_str: Option<String>,
    /// Sum of the three injury/fatality counts, missing counts taken as 0.
    pub total_victims: u32,
}

/// Numeric columns that can be range- or zero-filtered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NumericColumn {
    /// Hour of the day.
    Hour,
    /// Day of the month.
    Day,
    /// `minor_injuries_30d`
    #[serde(rename = "minor_injuries_30d")]
    #[strum(serialize = "minor_injuries_30d")]
    MinorInjuries,
    /// `serious_injuries_30d`
    #[serde(rename = "serious_injuries_30d")]
    #[strum(serialize = "serious_injuries_30d")]
    SeriousInjuries,
    /// `fatalities_30d`
    #[serde(rename = "fatalities_30d")]
    #[strum(serialize = "fatalities_30d")]
    Fatalities,
    /// `total_victims`
    TotalVictims,
}

impl NumericColumn {
    /// Reads this column from an accident. Missing injury counts yield
    /// `None`.
    #[must_use]
    pub fn value(self, accident: &Accident) -> Option<u32> {
        match self {
            Self::Hour => accident.hour.map(u32::from),
            Self::Day => accident.day.map(u32::from),
            Self::MinorInjuries => accident.minor_injuries_30d,
            Self::SeriousInjuries => accident.serious_injuries_30d,
            Self::Fatalities => accident.fatalities_30d,
            Self::TotalVictims => Some(accident.total_victims),
        }
    }

    /// Returns all numeric columns.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Hour,
            Self::Day,
            Self::MinorInjuries,
            Self::SeriousInjuries,
            Self::Fatalities,
            Self::TotalVictims,
        ]
    }

    /// The three per-severity count columns.
    #[must_use]
    pub const fn severities() -> &'static [Self] {
        &[Self::MinorInjuries, Self::SeriousInjuries, Self::Fatalities]
    }
}

/// Columns that can be summed as a chart metric.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VictimColumn {
    /// `minor_injuries_30d`
    #[serde(rename = "minor_injuries_30d")]
    #[strum(serialize = "minor_injuries_30d")]
    MinorInjuries,
    /// `serious_injuries_30d`
    #[serde(rename = "serious_injuries_30d")]
    #[strum(serialize = "serious_injuries_30d")]
    SeriousInjuries,
    /// `fatalities_30d`
    #[serde(rename = "fatalities_30d")]
    #[strum(serialize = "fatalities_30d")]
    Fatalities,
    /// `total_victims`
    TotalVictims,
}

impl VictimColumn {
    /// Human-readable label used in charts and legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinorInjuries => "Minor injuries",
            Self::SeriousInjuries => "Serious injuries",
            Self::Fatalities => "Fatalities",
            Self::TotalVictims => "Total number of victims",
        }
    }

    /// Reads this column from an accident, treating a missing count as 0.
    #[must_use]
    pub fn value(self, accident: &Accident) -> u32 {
        NumericColumn::from(self).value(accident).unwrap_or(0)
    }

    /// Returns all victim columns.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MinorInjuries,
            Self::SeriousInjuries,
            Self::Fatalities,
            Self::TotalVictims,
        ]
    }
}

impl From<VictimColumn> for NumericColumn {
    fn from(column: VictimColumn) -> Self {
        match column {
            VictimColumn::MinorInjuries => Self::MinorInjuries,
            VictimColumn::SeriousInjuries => Self::SeriousInjuries,
            VictimColumn::Fatalities => Self::Fatalities,
            VictimColumn::TotalVictims => Self::TotalVictims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accident() -> Accident {
        Accident {
            id: "a1".to_string(),
            day: Some(3),
            month: Some(Month::Feb),
            weekday: Some(Weekday::Friday),
            hour: Some(17),
            latitude: 38.72,
            longitude: -9.14,
            minor_injuries_30d: Some(2),
            serious_injuries_30d: None,
            fatalities_30d: Some(1),
            municipality: None,
            date: NaiveDate::from_ymd_opt(2023, 2, 3),
            date_str: Some("03/02/2023".to_string()),
            total_victims: 3,
        }
    }

    #[test]
    fn months_sort_in_calendar_order() {
        let mut months: Vec<Month> = ["Dec", "Apr", "Jan", "Aug", "Feb"]
            .iter()
            .map(|m| m.parse().unwrap())
            .collect();
        months.sort();
        assert_eq!(
            months,
            vec![Month::Jan, Month::Feb, Month::Apr, Month::Aug, Month::Dec]
        );
    }

    #[test]
    fn weekdays_sort_in_week_order() {
        let mut days: Vec<Weekday> = ["Sunday", "Friday", "Monday", "Wednesday"]
            .iter()
            .map(|d| d.parse().unwrap())
            .collect();
        days.sort();
        assert_eq!(
            days,
            vec![
                Weekday::Monday,
                Weekday::Wednesday,
                Weekday::Friday,
                Weekday::Sunday
            ]
        );
    }

    #[test]
    fn month_parses_full_and_abbreviated_names() {
        assert_eq!("January".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("jan".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("SEP".parse::<Month>().unwrap(), Month::Sep);
        assert_eq!("May".parse::<Month>().unwrap(), Month::May);
        assert!("Smarch".parse::<Month>().is_err());
    }

    #[test]
    fn month_displays_abbreviation() {
        assert_eq!(Month::Sep.to_string(), "Sep");
        assert_eq!(Weekday::Thursday.to_string(), "Thursday");
        assert_eq!(Month::Dec.number(), 12);
        assert_eq!(Month::Jan.number(), 1);
    }

    #[test]
    fn numeric_column_reads_missing_counts_as_none() {
        let a = accident();
        assert_eq!(NumericColumn::SeriousInjuries.value(&a), None);
        assert_eq!(NumericColumn::Fatalities.value(&a), Some(1));
        assert_eq!(NumericColumn::Hour.value(&a), Some(17));
        assert_eq!(VictimColumn::SeriousInjuries.value(&a), 0);
        assert_eq!(VictimColumn::TotalVictims.value(&a), 3);

        let undated = Accident {
            day: None,
            hour: None,
            ..a
        };
        assert_eq!(NumericColumn::Day.value(&undated), None);
        assert_eq!(NumericColumn::Hour.value(&undated), None);
    }

    #[test]
    fn whole_numbers_parse_from_integer_and_float_cells() {
        assert_eq!(parse_whole_u8("5"), Some(5));
        assert_eq!(parse_whole_u8(" 23 "), Some(23));
        assert_eq!(parse_whole_u8("5.0"), Some(5));
        assert_eq!(parse_whole_u8(""), None);
        assert_eq!(parse_whole_u8("5.5"), None);
        assert_eq!(parse_whole_u8("-1"), None);
        assert_eq!(parse_whole_u8("300"), None);
        assert_eq!(parse_whole_u8("five"), None);
        assert_eq!(parse_whole_u8("NaN"), None);
    }

    #[test]
    fn column_names_match_csv_headers() {
        assert_eq!(NumericColumn::Fatalities.to_string(), "fatalities_30d");
        assert_eq!(
            "minor_injuries_30d".parse::<NumericColumn>().unwrap(),
            NumericColumn::MinorInjuries
        );
        assert_eq!(
            serde_json::to_string(&VictimColumn::TotalVictims).unwrap(),
            "\"total_victims\""
        );
    }
}

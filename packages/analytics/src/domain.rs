//! Observed filter domains and the default (no-op) filter selection.

use std::collections::{BTreeMap, BTreeSet};

use accident_map_accident_models::{Accident, Month, NumericColumn, Weekday};
use accident_map_analytics_models::{
    DateRange, FilterDomains, FilterPredicate, FilterRule, FilterSpec, NumericRange,
};

/// Collects the values present in `accidents` for every filterable column.
#[must_use]
pub fn filter_domains(accidents: &[Accident]) -> FilterDomains {
    let weekdays: BTreeSet<Weekday> = accidents.iter().filter_map(|a| a.weekday).collect();
    let months: BTreeSet<Month> = accidents.iter().filter_map(|a| a.month).collect();
    let municipalities: BTreeSet<String> = accidents
        .iter()
        .filter_map(|a| a.municipality.clone())
        .collect();

    let mut ranges = BTreeMap::new();
    for &column in NumericColumn::all() {
        let mut values = accidents.iter().filter_map(|a| column.value(a));
        let Some(first) = values.next() else {
            continue;
        };
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        ranges.insert(column, NumericRange { min, max });
    }

    let mut dated = accidents.iter().filter_map(|a| a.date);
    let dates = dated.next().map(|first| {
        let (start, end) = dated.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        DateRange { start, end }
    });

    FilterDomains {
        weekdays: weekdays.into_iter().collect(),
        months: months.into_iter().collect(),
        municipalities: municipalities.into_iter().collect(),
        ranges,
        dates,
    }
}

/// Builds the dashboard's initial filter selection from `domains`.
///
/// Every widget gets a predicate spanning the full observed domain, but
/// each starts switched off, so the initial selection keeps every row
/// (including rows with missing values) until the user enables one.
#[must_use]
pub fn default_spec(domains: &FilterDomains) -> FilterSpec {
    let mut predicates = vec![
        FilterPredicate::off(FilterRule::Weekdays {
            allowed: domains.weekdays.iter().copied().collect(),
        }),
        FilterPredicate::off(FilterRule::Months {
            allowed: domains.months.iter().copied().collect(),
        }),
    ];

    if !domains.municipalities.is_empty() {
        predicates.push(FilterPredicate::off(FilterRule::Municipalities {
            allowed: domains.municipalities.iter().cloned().collect(),
        }));
    }

    for (&column, range) in &domains.ranges {
        if column == NumericColumn::TotalVictims {
            continue;
        }
        predicates.push(FilterPredicate::off(FilterRule::Range {
            column,
            lo: range.min,
            hi: range.max,
        }));
        if NumericColumn::severities().contains(&column) {
            predicates.push(FilterPredicate::off(FilterRule::ExactZero { column }));
        }
    }

    if let Some(dates) = domains.dates {
        predicates.push(FilterPredicate::off(FilterRule::DateInterval {
            start: dates.start,
            end: dates.end,
        }));
    }

    FilterSpec {
        predicates,
        disabled_groups: BTreeSet::new(),
    }
}

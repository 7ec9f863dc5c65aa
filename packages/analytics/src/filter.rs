//! The filter engine.
//!
//! Predicates are applied one after another to a view of borrowed
//! accidents; the record store itself is never touched. A disabled
//! predicate (or one in a disabled group) is skipped entirely, so an empty
//! or fully disabled [`FilterSpec`] returns every accident in input order.

use std::collections::BTreeSet;

use accident_map_accident_models::{Accident, NumericColumn};
use accident_map_analytics_models::{FilterRule, FilterSpec};

/// Applies every active predicate in `spec` to `accidents`.
///
/// When a column has both an exact-zero and a range predicate active, the
/// exact-zero one wins and the range is skipped.
#[must_use]
pub fn apply<'a>(accidents: &'a [Accident], spec: &FilterSpec) -> Vec<&'a Accident> {
    let view: Vec<&Accident> = accidents.iter().collect();
    apply_to_view(view, spec)
}

/// Same as [`apply`], for a view that has already been narrowed.
#[must_use]
pub fn apply_to_view<'a>(mut view: Vec<&'a Accident>, spec: &FilterSpec) -> Vec<&'a Accident> {
    let zero_only: BTreeSet<NumericColumn> = spec
        .active()
        .filter_map(|rule| match rule {
            FilterRule::ExactZero { column } => Some(*column),
            _ => None,
        })
        .collect();

    for rule in spec.active() {
        if let FilterRule::Range { column, .. } = rule
            && zero_only.contains(column)
        {
            log::debug!("Skipping range on {column}: restricted to zero");
            continue;
        }

        let before = view.len();
        view.retain(|accident| matches(rule, accident));
        log::debug!("{rule:?} removed {} row(s)", before - view.len());
    }

    view
}

/// Whether `accident` satisfies `rule`.
///
/// Missing values never match: an unknown weekday fails a weekday
/// membership test, a missing injury count fails a range, and an undated
/// accident fails any date interval.
#[must_use]
pub fn matches(rule: &FilterRule, accident: &Accident) -> bool {
    match rule {
        FilterRule::Weekdays { allowed } => accident.weekday.is_some_and(|w| allowed.contains(&w)),
        FilterRule::Months { allowed } => accident.month.is_some_and(|m| allowed.contains(&m)),
        FilterRule::Municipalities { allowed } => accident
            .municipality
            .as_ref()
            .is_some_and(|m| allowed.contains(m)),
        FilterRule::Range { column, lo, hi } => column
            .value(accident)
            .is_some_and(|v| (*lo..=*hi).contains(&v)),
        FilterRule::ExactZero { column } => column.value(accident) == Some(0),
        FilterRule::DateInterval { start, end } => accident
            .date
            .is_some_and(|d| (*start..=*end).contains(&d)),
    }
}

#[cfg(test)]
mod tests {
    use accident_map_accident_models::{Month, Weekday};
    use accident_map_analytics_models::{FilterGroup, FilterPredicate};
    use chrono::NaiveDate;

    use super::*;
    use crate::fixtures::{accidents, three_rows};

    fn ids(view: &[&Accident]) -> Vec<String> {
        view.iter().map(|a| a.id.clone()).collect()
    }

    fn sample() -> Vec<Accident> {
        accidents(&[
            ("1", 5, "Jan", "Thursday", 8, [Some(1), Some(0), Some(0)]),
            ("2", 31, "Apr", "Sunday", 23, [Some(0), Some(1), Some(1)]),
            ("3", 28, "Feb", "Tuesday", 14, [Some(2), Some(0), Some(0)]),
            ("4", 5, "Jan", "Thursday", 3, [None, Some(2), Some(3)]),
            ("5", 12, "Mar", "Saturday", 19, [Some(0), Some(0), Some(0)]),
        ])
    }

    #[test]
    fn no_predicates_is_identity() {
        let data = sample();
        let view = apply(&data, &FilterSpec::new());
        assert_eq!(view.len(), data.len());
        assert!(view.iter().zip(&data).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn disabled_predicates_have_no_effect() {
        let data = sample();
        let spec = FilterSpec {
            predicates: vec![FilterPredicate::off(FilterRule::Months {
                allowed: BTreeSet::new(),
            })],
            disabled_groups: BTreeSet::new(),
        };
        assert_eq!(apply(&data, &spec).len(), data.len());

        let grouped = FilterSpec::new()
            .with(FilterRule::ExactZero {
                column: NumericColumn::Fatalities,
            })
            .without_group(FilterGroup::Severity);
        assert_eq!(apply(&data, &grouped).len(), data.len());
    }

    #[test]
    fn membership_filters() {
        let data = sample();
        let spec = FilterSpec::new()
            .with(FilterRule::Months {
                allowed: [Month::Jan, Month::Feb].into_iter().collect(),
            })
            .with(FilterRule::Weekdays {
                allowed: [Weekday::Thursday].into_iter().collect(),
            });
        assert_eq!(ids(&apply(&data, &spec)), vec!["1", "4"]);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let data = sample();
        let spec = FilterSpec::new().with(FilterRule::Range {
            column: NumericColumn::Hour,
            lo: 8,
            hi: 19,
        });
        assert_eq!(ids(&apply(&data, &spec)), vec!["1", "3", "5"]);
    }

    #[test]
    fn degenerate_range_is_accepted() {
        let data = sample();
        let spec = FilterSpec::new().with(FilterRule::Range {
            column: NumericColumn::Day,
            lo: 5,
            hi: 5,
        });
        assert_eq!(ids(&apply(&data, &spec)), vec!["1", "4"]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let data = sample();
        let spec = FilterSpec::new().with(FilterRule::Range {
            column: NumericColumn::Hour,
            lo: 20,
            hi: 4,
        });
        assert!(apply(&data, &spec).is_empty());
    }

    #[test]
    fn missing_count_fails_range() {
        let data = sample();
        let spec = FilterSpec::new().with(FilterRule::Range {
            column: NumericColumn::MinorInjuries,
            lo: 0,
            hi: 10,
        });
        assert_eq!(ids(&apply(&data, &spec)), vec!["1", "2", "3", "5"]);
    }

    #[test]
    fn exact_zero_is_subset_of_full_range_and_idempotent() {
        let data = sample();
        let zero = FilterSpec::new().with(FilterRule::ExactZero {
            column: NumericColumn::Fatalities,
        });
        let full = FilterSpec::new().with(FilterRule::Range {
            column: NumericColumn::Fatalities,
            lo: 0,
            hi: 3,
        });

        let zero_view = apply(&data, &zero);
        let full_view = apply(&data, &full);
        assert_eq!(ids(&zero_view), vec!["1", "3", "5"]);
        assert!(zero_view.len() < full_view.len());
        assert!(
            zero_view
                .iter()
                .all(|a| full_view.iter().any(|b| std::ptr::eq(*a, *b)))
        );

        let twice = apply_to_view(zero_view.clone(), &zero);
        assert_eq!(ids(&twice), ids(&zero_view));
    }

    #[test]
    fn exact_zero_overrides_range_on_same_column() {
        let data = sample();
        let spec = FilterSpec::new()
            .with(FilterRule::Range {
                column: NumericColumn::Fatalities,
                lo: 1,
                hi: 3,
            })
            .with(FilterRule::ExactZero {
                column: NumericColumn::Fatalities,
            });
        assert_eq!(ids(&apply(&data, &spec)), vec!["1", "3", "5"]);
    }

    #[test]
    fn single_day_interval_excludes_undated_rows() {
        let data = sample();
        let day = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        let spec = FilterSpec::new().with(FilterRule::DateInterval {
            start: day,
            end: day,
        });
        let view = apply(&data, &spec);
        assert_eq!(ids(&view), vec!["1", "4"]);
        assert!(view.iter().all(|a| a.date == Some(day)));

        let whole_year = FilterSpec::new().with(FilterRule::DateInterval {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        });
        // "31 Apr" has no date, so it is the only row dropped.
        assert_eq!(ids(&apply(&data, &whole_year)), vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let data = three_rows();
        let spec = FilterSpec::new()
            .with(FilterRule::Weekdays {
                allowed: [Weekday::Monday].into_iter().collect(),
            })
            .with(FilterRule::Months {
                allowed: [Month::Jan].into_iter().collect(),
            });
        assert_eq!(ids(&apply(&data, &spec)), vec!["a"]);
    }

    #[test]
    fn input_is_not_modified() {
        let data = sample();
        let before = data.clone();
        let _ = apply(
            &data,
            &FilterSpec::new().with(FilterRule::ExactZero {
                column: NumericColumn::TotalVictims,
            }),
        );
        assert_eq!(data, before);
    }
}

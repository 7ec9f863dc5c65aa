//! Filter predicates.
//!
//! A [`FilterSpec`] is a flat list of independently toggleable predicates
//! combined with AND. The dashboard's widget groups map onto
//! [`FilterGroup`], and switching a group off disables every predicate in it
//! without losing the individual settings.

use std::collections::BTreeSet;

use accident_map_accident_models::{Month, NumericColumn, Weekday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Widget group a predicate belongs to.
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
pub enum FilterGroup {
    /// Weekday, month, hour, day and date predicates.
    Temporal,
    /// Injury and fatality predicates.
    Severity,
    /// Municipality predicates.
    Location,
}

/// A single rule over one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FilterRule {
    /// Keep rows whose weekday is in the set.
    Weekdays {
        /// Allowed weekdays.
        allowed: BTreeSet<Weekday>,
    },
    /// Keep rows whose month is in the set.
    Months {
        /// Allowed months.
        allowed: BTreeSet<Month>,
    },
    /// Keep rows whose municipality is in the set.
    Municipalities {
        /// Allowed municipality names.
        allowed: BTreeSet<String>,
    },
    /// Keep rows with `lo <= value <= hi`.
    Range {
        /// Column being tested.
        column: NumericColumn,
        /// Inclusive lower bound.
        lo: u32,
        /// Inclusive upper bound.
        hi: u32,
    },
    /// Keep rows whose value is exactly zero.
    ExactZero {
        /// Column being tested.
        column: NumericColumn,
    },
    /// Keep rows dated within `[start, end]`; undated rows are dropped.
    DateInterval {
        /// First day kept.
        start: NaiveDate,
        /// Last day kept.
        end: NaiveDate,
    },
}

impl FilterRule {
    /// The widget group this rule is shown in.
    #[must_use]
    pub fn group(&self) -> FilterGroup {
        match self {
            Self::Weekdays { .. } | Self::Months { .. } | Self::DateInterval { .. } => {
                FilterGroup::Temporal
            }
            Self::Municipalities { .. } => FilterGroup::Location,
            Self::Range { column, .. } | Self::ExactZero { column } => {
                if NumericColumn::severities().contains(column)
                    || *column == NumericColumn::TotalVictims
                {
                    FilterGroup::Severity
                } else {
                    FilterGroup::Temporal
                }
            }
        }
    }
}

/// A rule plus its on/off switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Disabled predicates have no effect.
    pub enabled: bool,
    /// The rule itself.
    #[serde(flatten)]
    pub rule: FilterRule,
}

impl FilterPredicate {
    /// An enabled predicate.
    #[must_use]
    pub const fn on(rule: FilterRule) -> Self {
        Self {
            enabled: true,
            rule,
        }
    }

    /// A disabled predicate.
    #[must_use]
    pub const fn off(rule: FilterRule) -> Self {
        Self {
            enabled: false,
            rule,
        }
    }
}

/// The user's full filter selection for one interaction.
///
/// An empty spec keeps every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Predicates in the order they are applied.
    #[serde(default)]
    pub predicates: Vec<FilterPredicate>,
    /// Groups whose predicates are all switched off.
    #[serde(default)]
    pub disabled_groups: BTreeSet<FilterGroup>,
}

impl FilterSpec {
    /// A spec with no predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enabled predicate.
    #[must_use]
    pub fn with(mut self, rule: FilterRule) -> Self {
        self.predicates.push(FilterPredicate::on(rule));
        self
    }

    /// Switches a whole group off.
    #[must_use]
    pub fn without_group(mut self, group: FilterGroup) -> Self {
        self.disabled_groups.insert(group);
        self
    }

    /// Predicates that take part in filtering: enabled and not in a
    /// disabled group.
    pub fn active(&self) -> impl Iterator<Item = &FilterRule> {
        self.predicates
            .iter()
            .filter(|p| p.enabled && !self.disabled_groups.contains(&p.rule.group()))
            .map(|p| &p.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_flattens_rule_tag() {
        let predicate = FilterPredicate::on(FilterRule::ExactZero {
            column: NumericColumn::Fatalities,
        });
        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "enabled": true, "rule": "exact_zero", "column": "fatalities_30d" })
        );
        let back: FilterPredicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, predicate);
    }

    #[test]
    fn deserializes_range_and_dates() {
        let spec: FilterSpec = serde_json::from_value(serde_json::json!({
            "predicates": [
                { "enabled": true, "rule": "range", "column": "hour", "lo": 8, "hi": 18 },
                { "enabled": false, "rule": "date_interval", "start": "2023-01-01", "end": "2023-01-31" },
                { "enabled": true, "rule": "months", "allowed": ["Jan", "Feb"] }
            ],
            "disabledGroups": ["severity"]
        }))
        .unwrap();
        assert_eq!(spec.predicates.len(), 3);
        assert!(spec.disabled_groups.contains(&FilterGroup::Severity));
        assert_eq!(spec.active().count(), 2);
    }

    #[test]
    fn groups_follow_dashboard_layout() {
        assert_eq!(
            FilterRule::Range {
                column: NumericColumn::Hour,
                lo: 0,
                hi: 23
            }
            .group(),
            FilterGroup::Temporal
        );
        assert_eq!(
            FilterRule::ExactZero {
                column: NumericColumn::SeriousInjuries
            }
            .group(),
            FilterGroup::Severity
        );
        assert_eq!(
            FilterRule::Municipalities {
                allowed: BTreeSet::new()
            }
            .group(),
            FilterGroup::Location
        );
    }

    #[test]
    fn disabled_group_hides_its_predicates() {
        let spec = FilterSpec::new()
            .with(FilterRule::ExactZero {
                column: NumericColumn::Fatalities,
            })
            .with(FilterRule::Range {
                column: NumericColumn::Day,
                lo: 1,
                hi: 10,
            })
            .without_group(FilterGroup::Severity);
        let active: Vec<&FilterRule> = spec.active().collect();
        assert_eq!(active.len(), 1);
        assert!(matches!(active[0], FilterRule::Range { .. }));
    }
}

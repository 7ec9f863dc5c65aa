//! Headline totals for the overview panel.

use accident_map_accident_models::{Accident, VictimColumn};
use accident_map_analytics_models::Overview;

/// Sums the accident count and victim totals over `view`.
///
/// Missing counts add nothing. `undated` counts accidents without a valid
/// date.
#[must_use]
pub fn compute_overview(view: &[&Accident]) -> Overview {
    let sum = |column: VictimColumn| -> u64 {
        view.iter()
            .map(|a| u64::from(column.value(a)))
            .sum()
    };

    Overview {
        accidents: view.len() as u64,
        fatalities: sum(VictimColumn::Fatalities),
        serious_injuries: sum(VictimColumn::SeriousInjuries),
        minor_injuries: sum(VictimColumn::MinorInjuries),
        total_victims: sum(VictimColumn::TotalVictims),
        undated: view.iter().filter(|a| a.date.is_none()).count() as u64,
    }
}

/// One-sentence summary, e.g. "In 2023, 3 road accidents were recorded in
/// Lisbon, with 3 fatalities, 1 serious injury and 2 minor injuries."
#[must_use]
pub fn describe(overview: &Overview, year: i32, city: &str) -> String {
    let mut sentence = format!(
        "In {year}, {} were recorded in {city}, with {}, {} and {}.",
        plural(overview.accidents, "road accident", "road accidents"),
        plural(overview.fatalities, "fatality", "fatalities"),
        plural(overview.serious_injuries, "serious injury", "serious injuries"),
        plural(overview.minor_injuries, "minor injury", "minor injuries"),
    );
    if overview.undated > 0 {
        sentence.push_str(&format!(
            " {} without a valid date {} excluded from date filters.",
            plural(overview.undated, "accident", "accidents"),
            if overview.undated == 1 { "is" } else { "are" },
        ));
    }
    sentence
}

fn plural(n: u64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

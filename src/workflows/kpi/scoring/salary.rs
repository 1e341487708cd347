use serde::{Deserialize, Serialize};

use super::config::IncreaseRule;

/// Raise recommendation derived from an employee's finalized annual scores.
/// Purely advisory: applying the new salary is an explicit manager action on
/// the employee directory, not an engine side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryIncreaseSuggestion {
    pub avg_score: f64,
    pub percent_increase: f64,
    pub suggested_salary: u64,
}

/// First rule in stored order whose band contains the score. Bands are kept
/// non-overlapping by the configuration editor; should an unvalidated config
/// slip through, first match wins and a gap earns no increase.
pub fn matching_rule(rules: &[IncreaseRule], avg_score: f64) -> Option<&IncreaseRule> {
    rules.iter().find(|rule| {
        f64::from(rule.min_score) <= avg_score && avg_score <= f64::from(rule.max_score)
    })
}

/// Build the suggestion for a finalized average score against the configured
/// increase table. An unmatched score keeps the current salary at 0%.
pub fn suggest_increase(
    rules: &[IncreaseRule],
    avg_score: f64,
    base_salary: u64,
) -> SalaryIncreaseSuggestion {
    let percent_increase = matching_rule(rules, avg_score)
        .map(|rule| rule.percent_increase)
        .unwrap_or(0.0);

    let suggested_salary =
        (base_salary as f64 * (1.0 + percent_increase / 100.0)).round() as u64;

    SalaryIncreaseSuggestion {
        avg_score,
        percent_increase,
        suggested_salary,
    }
}

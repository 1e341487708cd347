/// A single goal cannot contribute more than 150% achievement, however far
/// the actual overshoots the target.
pub const PER_GOAL_CAP: f64 = 150.0;

/// The department-level projected score tops out at 120%.
pub const OVERALL_CAP: f64 = 120.0;

/// One department goal joined with its submitted actual.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalOutcome {
    pub target: f64,
    pub weight: u32,
    pub actual: f64,
}

/// Achievement rate for one goal as a capped percentage. A non-positive
/// target yields 0 rather than dividing by zero.
pub fn achievement_rate(target: f64, actual: f64) -> f64 {
    if target > 0.0 {
        ((actual / target) * 100.0).min(PER_GOAL_CAP)
    } else {
        0.0
    }
}

/// Weighted projected score for a department: per-goal rates capped at 150,
/// weighted mean, overall cap at 120, rounded. The double cap rewards
/// over-performance on individual metrics without letting one outlier goal
/// dominate the department score.
pub fn goal_achievement(outcomes: &[GoalOutcome]) -> u32 {
    let total_weight: u64 = outcomes.iter().map(|goal| u64::from(goal.weight)).sum();
    if total_weight == 0 {
        return 0;
    }

    let weighted_sum: f64 = outcomes
        .iter()
        .map(|goal| achievement_rate(goal.target, goal.actual) * f64::from(goal.weight))
        .sum();

    let projected = weighted_sum / total_weight as f64;
    projected.min(OVERALL_CAP).round() as u32
}

//! Pure scoring arithmetic: the weighted aggregator, the department goal
//! achievement calculator, and the tiered salary-increase lookup, plus the
//! configuration they consume. Everything here is side-effect free; the
//! service module owns persistence and state transitions.

mod aggregate;
mod config;
mod goals;
mod salary;

pub use aggregate::{final_weighted_total, weighted_average};
pub use config::{
    ConfigurationError, Criterion, DepartmentGoal, DepartmentKpiConfig, IncreaseRule, KpiWeights,
    SalaryConfig,
};
pub use goals::{achievement_rate, goal_achievement, GoalOutcome, OVERALL_CAP, PER_GOAL_CAP};
pub use salary::{matching_rule, suggest_increase, SalaryIncreaseSuggestion};

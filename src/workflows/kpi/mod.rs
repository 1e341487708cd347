//! KPI evaluation and salary-adjustment engine.
//!
//! Weighted multi-source scores (task completion, manager rating, department
//! criteria) flow through a two-phase approval lifecycle (self-assessment →
//! cross-check → completed) and feed a tiered salary-increase recommendation.
//! Employee data, completion rates, configuration, and persistence come from
//! collaborators behind the traits in [`repository`].

pub mod domain;
pub mod goal_sheet;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CrossCheckReview, Cycle, DepartmentDraft, Employee, EmployeeId, EmploymentStatus,
    EvaluationId, EvaluationPeriod, EvaluationStatus, KpiEvaluation, SelfAssessment,
    ValidationError,
};
pub use goal_sheet::{goal_sheet_from_path, parse_goal_sheet, GoalSheetError, GoalSheetRow};
pub use repository::{
    CompletionRateSource, DirectoryError, DraftRepository, EmployeeDirectory,
    EvaluationRepository, EvaluationSummaryView, RepositoryError,
};
pub use router::kpi_router;
pub use scoring::{
    achievement_rate, final_weighted_total, goal_achievement, weighted_average,
    ConfigurationError, Criterion, DepartmentGoal, DepartmentKpiConfig, GoalOutcome,
    IncreaseRule, KpiWeights, SalaryConfig, SalaryIncreaseSuggestion, OVERALL_CAP, PER_GOAL_CAP,
};
pub use service::{
    CreateEvaluationRequest, CrossCheckRequest, DepartmentCycleRequest, EngineError,
    InvalidStateError, KpiEvaluationService, NotFoundError,
};

use serde::Serialize;

use super::domain::{
    Cycle, DepartmentDraft, Employee, EmployeeId, EvaluationId, KpiEvaluation,
};

/// Storage abstraction for evaluation records so the service module can be
/// exercised in isolation.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: KpiEvaluation) -> Result<KpiEvaluation, RepositoryError>;
    fn update(&self, record: KpiEvaluation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<KpiEvaluation>, RepositoryError>;
    fn for_employee(&self, id: &EmployeeId) -> Result<Vec<KpiEvaluation>, RepositoryError>;
}

/// Persistence for department goal drafts, keyed by department and cycle.
pub trait DraftRepository: Send + Sync {
    fn save_draft(&self, draft: DepartmentDraft) -> Result<(), RepositoryError>;
    fn fetch_draft(
        &self,
        department: &str,
        cycle: &Cycle,
    ) -> Result<Option<DepartmentDraft>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the employee directory collaborator.
pub trait EmployeeDirectory: Send + Sync {
    fn find(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError>;
    fn active_in_department(&self, department: &str) -> Result<Vec<Employee>, DirectoryError>;
}

/// Daily-task completion rates supplied by the attendance collaborator,
/// expressed as a 0-100 percentage per employee and cycle.
pub trait CompletionRateSource: Send + Sync {
    fn completion_rate(
        &self,
        id: &EmployeeId,
        cycle: &Cycle,
    ) -> Result<Option<f64>, DirectoryError>;
}

/// Error enumeration for directory and attendance lookups.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of an evaluation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummaryView {
    pub evaluation_id: EvaluationId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub cycle: Cycle,
    pub period: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
}

impl KpiEvaluation {
    pub fn summary_view(&self) -> EvaluationSummaryView {
        EvaluationSummaryView {
            evaluation_id: self.id.clone(),
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            cycle: self.cycle.clone(),
            period: self.period.label(),
            status: self.status.label(),
            total_score: self.total_score,
        }
    }
}

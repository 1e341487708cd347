use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::{info, warn};

use super::domain::{
    CrossCheckReview, Cycle, DepartmentDraft, EmployeeId, EvaluationId, EvaluationPeriod,
    EvaluationStatus, KpiEvaluation, SelfAssessment, ValidationError,
};
use super::repository::{
    CompletionRateSource, DirectoryError, DraftRepository, EmployeeDirectory,
    EvaluationRepository, RepositoryError,
};
use super::scoring::{
    final_weighted_total, goal_achievement, suggest_increase, weighted_average, GoalOutcome,
    SalaryConfig, SalaryIncreaseSuggestion,
};

/// Service composing the scoring functions, the evaluation repository, and
/// the directory collaborators into the KPI lifecycle operations.
pub struct KpiEvaluationService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    config: SalaryConfig,
    /// Serializes state transitions so concurrent cross-checks on one record
    /// cannot both finalize; the loser observes Completed and fails.
    transition: Mutex<()>,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Inputs for opening one evaluation, fully supplied up front. P1 and P3 may
/// be recomputed from collaborator data before anything is persisted.
#[derive(Debug, Clone)]
pub struct CreateEvaluationRequest {
    pub employee_id: EmployeeId,
    pub period: EvaluationPeriod,
    pub cycle: String,
    pub score_p1: u32,
    pub score_p2: u32,
    pub score_p3: u32,
    pub notes: String,
    pub criteria_scores: Option<BTreeMap<String, u32>>,
    pub is_self_assessment: bool,
}

/// Manager inputs finalizing a pending evaluation.
#[derive(Debug, Clone)]
pub struct CrossCheckRequest {
    pub evaluation_id: EvaluationId,
    pub score_p1: u32,
    pub score_p2: u32,
    pub score_p3: u32,
    pub notes: String,
    pub evaluated_by: String,
}

/// Inputs for a department-wide generation run or draft save.
#[derive(Debug, Clone)]
pub struct DepartmentCycleRequest {
    pub department: String,
    pub period: EvaluationPeriod,
    pub cycle: String,
    pub actuals: BTreeMap<String, f64>,
}

impl<R, D> KpiEvaluationService<R, D>
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, config: SalaryConfig) -> Self {
        Self {
            repository,
            directory,
            config,
            transition: Mutex::new(()),
        }
    }

    /// Open an evaluation and persist it as pending review.
    ///
    /// P1 is derived from the attendance collaborator's task-completion rate
    /// for the cycle whenever one exists; the submitted P1 only stands when
    /// no rate is on record. P3 is computed from department criteria when the
    /// department has criteria configured and per-criterion scores were
    /// submitted; otherwise the manual P3 is taken as-is with no criteria
    /// payload.
    pub fn create_evaluation(
        &self,
        request: CreateEvaluationRequest,
    ) -> Result<KpiEvaluation, EngineError> {
        if request.employee_id.0.trim().is_empty() {
            return Err(ValidationError::MissingEmployee.into());
        }
        let cycle = Cycle::parse(request.period, &request.cycle)?;

        let employee = self
            .directory
            .find(&request.employee_id)?
            .ok_or_else(|| NotFoundError::Employee(request.employee_id.clone()))?;

        let score_p1 = match self.directory.completion_rate(&employee.id, &cycle)? {
            Some(rate) => rate.round() as u32,
            None => request.score_p1,
        };

        let criteria = self
            .config
            .department(&employee.department)
            .map(|entry| entry.criteria.as_slice())
            .unwrap_or_default();

        let (score_p3, criteria_details) = match (&request.criteria_scores, criteria.is_empty()) {
            (Some(scores), false) => {
                let mut pairs = Vec::with_capacity(criteria.len());
                let mut details = BTreeMap::new();
                for criterion in criteria {
                    let score = scores.get(&criterion.id).copied().ok_or_else(|| {
                        ValidationError::MissingCriterionScore(criterion.id.clone())
                    })?;
                    pairs.push((score, criterion.weight));
                    details.insert(criterion.id.clone(), score);
                }
                (weighted_average(pairs), Some(details))
            }
            _ => (request.score_p3, None),
        };

        let record = KpiEvaluation {
            id: next_evaluation_id(),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            period: request.period,
            cycle,
            self_assessment: Some(SelfAssessment {
                score_p1,
                score_p2: request.score_p2,
                score_p3,
                notes: request.notes,
                criteria_details,
            }),
            review: None,
            status: EvaluationStatus::PendingReview,
            total_score: None,
            is_self_assessment: request.is_self_assessment,
        };

        let stored = self.repository.insert(record)?;
        info!(
            evaluation = %stored.id,
            employee = %stored.employee_id,
            cycle = %stored.cycle,
            "evaluation opened for review"
        );
        Ok(stored)
    }

    /// Finalize a pending evaluation with the manager's scores.
    ///
    /// The total is the weight-percentage sum of the final component scores.
    /// The original self-assessment is retained untouched for comparison, and
    /// a completed record is immutable from here on.
    pub fn submit_cross_check(
        &self,
        request: CrossCheckRequest,
    ) -> Result<KpiEvaluation, EngineError> {
        // A poisoned lock only means another cross-check panicked; the state
        // check below still decides whether this transition may proceed.
        let _guard = match self.transition.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut record = self
            .repository
            .fetch(&request.evaluation_id)?
            .ok_or_else(|| NotFoundError::Evaluation(request.evaluation_id.clone()))?;

        if record.status != EvaluationStatus::PendingReview {
            return Err(InvalidStateError::AlreadyCompleted {
                id: record.id.clone(),
            }
            .into());
        }

        let total = final_weighted_total(
            self.config.kpi_weights,
            request.score_p1,
            request.score_p2,
            request.score_p3,
        );

        record.review = Some(CrossCheckReview {
            score_p1: request.score_p1,
            score_p2: request.score_p2,
            score_p3: request.score_p3,
            notes: request.notes,
            evaluated_by: request.evaluated_by,
            evaluated_on: Local::now().date_naive(),
        });
        record.status = EvaluationStatus::Completed;
        record.total_score = Some(total);

        self.repository.update(record.clone())?;
        info!(evaluation = %record.id, total, "evaluation cross-checked and completed");
        Ok(record)
    }

    /// Fetch one evaluation for API responses.
    pub fn get(&self, id: &EvaluationId) -> Result<KpiEvaluation, EngineError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| NotFoundError::Evaluation(id.clone()).into())
    }

    /// Raise recommendation from the mean completed total score of `year`.
    /// No completed evaluations in that year means no suggestion; the
    /// recommendation itself never writes anything.
    pub fn suggest_salary_increase(
        &self,
        employee_id: &EmployeeId,
        year: i32,
    ) -> Result<Option<SalaryIncreaseSuggestion>, EngineError> {
        let employee = self
            .directory
            .find(employee_id)?
            .ok_or_else(|| NotFoundError::Employee(employee_id.clone()))?;

        let totals: Vec<u32> = self
            .repository
            .for_employee(employee_id)?
            .into_iter()
            .filter(|record| {
                record.status == EvaluationStatus::Completed && record.cycle.year() == Some(year)
            })
            .filter_map(|record| record.total_score)
            .collect();

        if totals.is_empty() {
            return Ok(None);
        }

        let avg_score = f64::from(totals.iter().sum::<u32>()) / totals.len() as f64;
        Ok(Some(suggest_increase(
            &self.config.increase_rules,
            avg_score,
            employee.base_salary,
        )))
    }

    /// Bulk-create directly-completed evaluations for every active employee
    /// of a department from the projected goal score.
    ///
    /// This deliberately bypasses the self-assessment/cross-check phases: the
    /// same department-level score applies uniformly, with no per-employee
    /// variation. Each insert is its own unit of work; failures are logged
    /// and excluded from the returned count, never rolled back or retried.
    /// The cancel flag stops the run before the next employee.
    pub fn generate_department_evaluations(
        &self,
        request: DepartmentCycleRequest,
        cancel: &AtomicBool,
    ) -> Result<usize, EngineError> {
        let cycle = Cycle::parse(request.period, &request.cycle)?;
        let entry = self
            .config
            .department(&request.department)
            .ok_or_else(|| NotFoundError::Department(request.department.clone()))?;
        if entry.goals.is_empty() {
            return Err(ValidationError::NoDepartmentGoals(request.department).into());
        }

        let outcomes: Vec<GoalOutcome> = entry
            .goals
            .iter()
            .map(|goal| GoalOutcome {
                target: goal.target,
                weight: goal.weight,
                actual: request.actuals.get(&goal.id).copied().unwrap_or(0.0),
            })
            .collect();
        let projected = goal_achievement(&outcomes);
        let total = final_weighted_total(self.config.kpi_weights, projected, projected, projected);

        let employees = self.directory.active_in_department(&entry.department)?;
        let today = Local::now().date_naive();
        let mut affected = 0;

        for employee in employees {
            if cancel.load(Ordering::Relaxed) {
                info!(
                    department = %entry.department,
                    affected,
                    "department generation cancelled"
                );
                break;
            }

            let record = KpiEvaluation {
                id: next_evaluation_id(),
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                period: request.period,
                cycle: cycle.clone(),
                self_assessment: None,
                review: Some(CrossCheckReview {
                    score_p1: projected,
                    score_p2: projected,
                    score_p3: projected,
                    notes: format!(
                        "generated from {} department goals for {}",
                        entry.department, cycle
                    ),
                    evaluated_by: "department-goals".to_string(),
                    evaluated_on: today,
                }),
                status: EvaluationStatus::Completed,
                total_score: Some(total),
                is_self_assessment: false,
            };

            match self.repository.insert(record) {
                Ok(_) => affected += 1,
                Err(error) => {
                    warn!(
                        employee = %employee.id,
                        department = %entry.department,
                        %error,
                        "skipping employee in department generation"
                    );
                }
            }
        }

        info!(
            department = %entry.department,
            cycle = %cycle,
            projected,
            affected,
            "department evaluations generated"
        );
        Ok(affected)
    }

    /// Persist goal actuals for iterative editing without generating any
    /// evaluation records.
    pub fn save_department_draft(
        &self,
        request: DepartmentCycleRequest,
    ) -> Result<(), EngineError> {
        let cycle = Cycle::parse(request.period, &request.cycle)?;
        let entry = self
            .config
            .department(&request.department)
            .ok_or_else(|| NotFoundError::Department(request.department.clone()))?;

        self.repository.save_draft(DepartmentDraft {
            department: entry.department.clone(),
            cycle,
            actuals: request.actuals,
        })?;
        Ok(())
    }
}

/// Transition attempted from a state that does not allow it. Nothing is
/// mutated when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum InvalidStateError {
    #[error("evaluation {id} is already completed and immutable")]
    AlreadyCompleted { id: EvaluationId },
}

/// Referenced entity is unknown to the engine or its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("employee {0} not found")]
    Employee(EmployeeId),
    #[error("evaluation {0} not found")]
    Evaluation(EvaluationId),
    #[error("department '{0}' has no kpi configuration")]
    Department(String),
}

/// Error raised by the KPI evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::kpi::domain::{
    Cycle, DepartmentDraft, Employee, EmployeeId, EmploymentStatus, EvaluationId,
    EvaluationPeriod, KpiEvaluation,
};
use crate::workflows::kpi::repository::{
    CompletionRateSource, DirectoryError, DraftRepository, EmployeeDirectory,
    EvaluationRepository, RepositoryError,
};
use crate::workflows::kpi::scoring::{
    Criterion, DepartmentGoal, DepartmentKpiConfig, IncreaseRule, KpiWeights, SalaryConfig,
};
use crate::workflows::kpi::service::{CreateEvaluationRequest, KpiEvaluationService};

pub(super) fn salary_config() -> SalaryConfig {
    SalaryConfig {
        kpi_weights: KpiWeights {
            p1: 40,
            p2: 30,
            p3: 30,
        },
        department_kpis: vec![
            DepartmentKpiConfig {
                department: "Engineering".to_string(),
                criteria: vec![
                    Criterion {
                        id: "code-quality".to_string(),
                        name: "Code quality".to_string(),
                        weight: 60,
                    },
                    Criterion {
                        id: "collaboration".to_string(),
                        name: "Collaboration".to_string(),
                        weight: 40,
                    },
                ],
                goals: vec![
                    DepartmentGoal {
                        id: "releases".to_string(),
                        name: "Releases shipped".to_string(),
                        target: 100.0,
                        weight: 50,
                        unit: "count".to_string(),
                    },
                    DepartmentGoal {
                        id: "incidents".to_string(),
                        name: "Incident-free days".to_string(),
                        target: 50.0,
                        weight: 50,
                        unit: "days".to_string(),
                    },
                ],
            },
            DepartmentKpiConfig {
                department: "Support".to_string(),
                criteria: Vec::new(),
                goals: Vec::new(),
            },
        ],
        increase_rules: vec![
            IncreaseRule {
                min_score: 0,
                max_score: 69,
                percent_increase: 0.0,
            },
            IncreaseRule {
                min_score: 70,
                max_score: 89,
                percent_increase: 3.0,
            },
            IncreaseRule {
                min_score: 90,
                max_score: 100,
                percent_increase: 5.0,
            },
        ],
    }
}

pub(super) fn employee(id: &str, name: &str, department: &str) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        department: department.to_string(),
        base_salary: 10_000_000,
        status: EmploymentStatus::Active,
        hire_date: NaiveDate::from_ymd_opt(2022, 3, 14).expect("valid date"),
    }
}

pub(super) fn engineering_roster() -> Vec<Employee> {
    let mut roster = vec![
        employee("emp-001", "Linh Tran", "Engineering"),
        employee("emp-002", "Minh Pham", "Engineering"),
        employee("emp-003", "Huong Le", "Engineering"),
        employee("emp-004", "Quan Vo", "Engineering"),
        employee("emp-005", "Thao Nguyen", "Engineering"),
    ];
    let mut former = employee("emp-006", "Binh Dao", "Engineering");
    former.status = EmploymentStatus::Inactive;
    roster.push(former);
    roster.push(employee("emp-010", "An Hoang", "Support"));
    roster
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    evaluations: Arc<Mutex<HashMap<EvaluationId, KpiEvaluation>>>,
    drafts: Arc<Mutex<HashMap<(String, Cycle), DepartmentDraft>>>,
}

impl MemoryRepository {
    pub(super) fn evaluation_count(&self) -> usize {
        self.evaluations.lock().expect("repository mutex poisoned").len()
    }
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, record: KpiEvaluation) -> Result<KpiEvaluation, RepositoryError> {
        let mut guard = self.evaluations.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: KpiEvaluation) -> Result<(), RepositoryError> {
        let mut guard = self.evaluations.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<KpiEvaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_employee(&self, id: &EmployeeId) -> Result<Vec<KpiEvaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.employee_id == id)
            .cloned()
            .collect())
    }
}

impl DraftRepository for MemoryRepository {
    fn save_draft(&self, draft: DepartmentDraft) -> Result<(), RepositoryError> {
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert((draft.department.clone(), draft.cycle.clone()), draft);
        Ok(())
    }

    fn fetch_draft(
        &self,
        department: &str,
        cycle: &Cycle,
    ) -> Result<Option<DepartmentDraft>, RepositoryError> {
        let guard = self.drafts.lock().expect("draft mutex poisoned");
        Ok(guard
            .get(&(department.to_string(), cycle.clone()))
            .cloned())
    }
}

/// Repository that rejects inserts for one employee, for partial-failure
/// batch scenarios.
pub(super) struct RejectingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) reject_employee: EmployeeId,
}

impl EvaluationRepository for RejectingRepository {
    fn insert(&self, record: KpiEvaluation) -> Result<KpiEvaluation, RepositoryError> {
        if record.employee_id == self.reject_employee {
            return Err(RepositoryError::Unavailable("write quota exceeded".to_string()));
        }
        self.inner.insert(record)
    }

    fn update(&self, record: KpiEvaluation) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<KpiEvaluation>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn for_employee(&self, id: &EmployeeId) -> Result<Vec<KpiEvaluation>, RepositoryError> {
        self.inner.for_employee(id)
    }
}

impl DraftRepository for RejectingRepository {
    fn save_draft(&self, draft: DepartmentDraft) -> Result<(), RepositoryError> {
        self.inner.save_draft(draft)
    }

    fn fetch_draft(
        &self,
        department: &str,
        cycle: &Cycle,
    ) -> Result<Option<DepartmentDraft>, RepositoryError> {
        self.inner.fetch_draft(department, cycle)
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    employees: HashMap<EmployeeId, Employee>,
    completion_rates: HashMap<(EmployeeId, Cycle), f64>,
}

impl MemoryDirectory {
    pub(super) fn with_roster(roster: Vec<Employee>) -> Self {
        Self {
            employees: roster
                .into_iter()
                .map(|employee| (employee.id.clone(), employee))
                .collect(),
            completion_rates: HashMap::new(),
        }
    }

    pub(super) fn set_completion_rate(&mut self, id: &str, cycle: &str, rate: f64) {
        self.completion_rates.insert(
            (EmployeeId(id.to_string()), Cycle(cycle.to_string())),
            rate,
        );
    }
}

impl EmployeeDirectory for MemoryDirectory {
    fn find(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        Ok(self.employees.get(id).cloned())
    }

    fn active_in_department(&self, department: &str) -> Result<Vec<Employee>, DirectoryError> {
        let mut matches: Vec<Employee> = self
            .employees
            .values()
            .filter(|employee| {
                employee.department == department
                    && employee.status == EmploymentStatus::Active
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(matches)
    }
}

impl CompletionRateSource for MemoryDirectory {
    fn completion_rate(
        &self,
        id: &EmployeeId,
        cycle: &Cycle,
    ) -> Result<Option<f64>, DirectoryError> {
        Ok(self
            .completion_rates
            .get(&(id.clone(), cycle.clone()))
            .copied())
    }
}

pub(super) fn build_service() -> (
    KpiEvaluationService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
    Arc<MemoryDirectory>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::with_roster(engineering_roster()));
    let service =
        KpiEvaluationService::new(repository.clone(), directory.clone(), salary_config());
    (service, repository, directory)
}

pub(super) fn create_request(employee_id: &str) -> CreateEvaluationRequest {
    CreateEvaluationRequest {
        employee_id: EmployeeId(employee_id.to_string()),
        period: EvaluationPeriod::Month,
        cycle: "2024-05".to_string(),
        score_p1: 75,
        score_p2: 80,
        score_p3: 70,
        notes: "steady delivery this cycle".to_string(),
        criteria_scores: Some(BTreeMap::from([
            ("code-quality".to_string(), 90),
            ("collaboration".to_string(), 70),
        ])),
        is_self_assessment: true,
    }
}

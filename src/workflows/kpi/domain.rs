use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees owned by the directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for persisted KPI evaluation records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory snapshot of one employee. Read-only to the engine; base salary
/// changes are the directory's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub base_salary: u64,
    pub status: EmploymentStatus,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    Active,
    Inactive,
    Pending,
}

impl EmploymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::Inactive => "inactive",
            EmploymentStatus::Pending => "pending",
        }
    }
}

/// Granularity of one evaluation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationPeriod {
    Month,
    Quarter,
    Year,
}

impl EvaluationPeriod {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationPeriod::Month => "month",
            EvaluationPeriod::Quarter => "quarter",
            EvaluationPeriod::Year => "year",
        }
    }
}

/// Validated period label identifying one evaluation instance, e.g. `2024-05`
/// for a month, `2024-Q2` for a quarter, `2024` for a year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(pub String);

impl Cycle {
    pub fn parse(period: EvaluationPeriod, label: &str) -> Result<Self, ValidationError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingCycle);
        }

        let malformed = || ValidationError::MalformedCycle {
            label: trimmed.to_string(),
            period,
        };

        let (year_part, rest) = match trimmed.split_once('-') {
            Some((year, rest)) => (year, Some(rest)),
            None => (trimmed, None),
        };

        if year_part.len() != 4 || year_part.parse::<i32>().is_err() {
            return Err(malformed());
        }

        match (period, rest) {
            (EvaluationPeriod::Year, None) => {}
            (EvaluationPeriod::Month, Some(month)) => {
                let valid = month.len() == 2
                    && month
                        .parse::<u8>()
                        .map(|value| (1..=12).contains(&value))
                        .unwrap_or(false);
                if !valid {
                    return Err(malformed());
                }
            }
            (EvaluationPeriod::Quarter, Some(quarter)) => {
                let valid = matches!(quarter, "Q1" | "Q2" | "Q3" | "Q4");
                if !valid {
                    return Err(malformed());
                }
            }
            _ => return Err(malformed()),
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Calendar year the label falls in, used for annual score averaging.
    pub fn year(&self) -> Option<i32> {
        self.0.get(..4).and_then(|year| year.parse().ok())
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scores submitted when the evaluation is opened. Immutable once the
/// cross-check phase begins; kept verbatim for audit comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfAssessment {
    pub score_p1: u32,
    pub score_p2: u32,
    pub score_p3: u32,
    pub notes: String,
    /// Per-criterion scores when P3 was derived from department criteria.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_details: Option<BTreeMap<String, u32>>,
}

/// Manager-finalized scores recorded at cross-check (or at bulk generation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheckReview {
    pub score_p1: u32,
    pub score_p2: u32,
    pub score_p3: u32,
    pub notes: String,
    pub evaluated_by: String,
    pub evaluated_on: NaiveDate,
}

/// Lifecycle state of one evaluation record. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    PendingReview,
    Completed,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::PendingReview => "pending_review",
            EvaluationStatus::Completed => "completed",
        }
    }
}

/// The central evaluation entity, owned by the engine once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiEvaluation {
    pub id: EvaluationId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub period: EvaluationPeriod,
    pub cycle: Cycle,
    pub self_assessment: Option<SelfAssessment>,
    pub review: Option<CrossCheckReview>,
    pub status: EvaluationStatus,
    /// Present only once the record is completed.
    pub total_score: Option<u32>,
    /// Whether the creator was rating themselves or a managed subordinate.
    pub is_self_assessment: bool,
}

/// Draft goal actuals for one department and cycle, editable until a
/// generation run converts them into evaluation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentDraft {
    pub department: String,
    pub cycle: Cycle,
    pub actuals: BTreeMap<String, f64>,
}

/// Rejected input shapes. Surfaced to the caller before any write happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("employee id is required")]
    MissingEmployee,
    #[error("cycle label is required")]
    MissingCycle,
    #[error("cycle '{label}' is not a valid {} label", period.label())]
    MalformedCycle {
        label: String,
        period: EvaluationPeriod,
    },
    #[error("criterion '{0}' has no submitted score")]
    MissingCriterionScore(String),
    #[error("department '{0}' has no configured goals")]
    NoDepartmentGoals(String),
}

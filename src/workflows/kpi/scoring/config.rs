use serde::{Deserialize, Serialize};

/// Percentage weights for the three KPI components (task completion, manager
/// rating, department criteria). Nominally sum to 100; the engine computes
/// with whatever it is given, normalization is the editor's problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiWeights {
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
}

impl KpiWeights {
    pub const fn total(self) -> u32 {
        self.p1 + self.p2 + self.p3
    }
}

/// Detailed sub-score composing P3 for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    pub weight: u32,
}

/// Department-level objective feeding the automated projected score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentGoal {
    pub id: String,
    pub name: String,
    pub target: f64,
    pub weight: u32,
    pub unit: String,
}

/// Criteria and goals configured for one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentKpiConfig {
    pub department: String,
    pub criteria: Vec<Criterion>,
    pub goals: Vec<DepartmentGoal>,
}

/// One tier of the salary-increase table: scores in `min_score..=max_score`
/// earn `percent_increase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncreaseRule {
    pub min_score: u32,
    pub max_score: u32,
    pub percent_increase: f64,
}

/// Evaluation configuration owned by the configuration collaborator and read
/// by the engine at service construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryConfig {
    pub kpi_weights: KpiWeights,
    pub department_kpis: Vec<DepartmentKpiConfig>,
    pub increase_rules: Vec<IncreaseRule>,
}

impl SalaryConfig {
    pub fn department(&self, name: &str) -> Option<&DepartmentKpiConfig> {
        self.department_kpis
            .iter()
            .find(|entry| entry.department == name)
    }

    /// Save-time check run by the configuration editor, not by the engine.
    /// Rejects weights that do not sum to 100 and increase bands that invert
    /// or overlap. Gaps between bands stay legal; scores falling into a gap
    /// simply earn no increase at lookup time.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let total = self.kpi_weights.total();
        if total != 100 {
            return Err(ConfigurationError::WeightsNotNormalized { total });
        }

        for rule in &self.increase_rules {
            if rule.min_score > rule.max_score {
                return Err(ConfigurationError::InvertedBand {
                    min_score: rule.min_score,
                    max_score: rule.max_score,
                });
            }
        }

        let mut bands: Vec<(u32, u32)> = self
            .increase_rules
            .iter()
            .map(|rule| (rule.min_score, rule.max_score))
            .collect();
        bands.sort_unstable();
        for pair in bands.windows(2) {
            if pair[1].0 <= pair[0].1 {
                return Err(ConfigurationError::OverlappingBands {
                    first: pair[0],
                    second: pair[1],
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("kpi weights must sum to 100, got {total}")]
    WeightsNotNormalized { total: u32 },
    #[error("increase band {min_score}-{max_score} has min above max")]
    InvertedBand { min_score: u32, max_score: u32 },
    #[error("increase bands {first:?} and {second:?} overlap")]
    OverlappingBands { first: (u32, u32), second: (u32, u32) },
}

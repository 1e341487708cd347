//! CSV goal sheets let department leads preview a projected score from a
//! spreadsheet export before committing actuals through the draft/generate
//! operations. Expected columns: `goal,target,weight,actual`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::scoring::GoalOutcome;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalSheetRow {
    #[serde(rename = "goal")]
    pub name: String,
    pub target: f64,
    pub weight: u32,
    pub actual: f64,
}

impl GoalSheetRow {
    pub fn outcome(&self) -> GoalOutcome {
        GoalOutcome {
            target: self.target,
            weight: self.weight,
            actual: self.actual,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GoalSheetError {
    #[error("failed to open goal sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse goal sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("goal sheet contains no rows")]
    Empty,
}

pub fn parse_goal_sheet<R: Read>(reader: R) -> Result<Vec<GoalSheetRow>, GoalSheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize::<GoalSheetRow>() {
        rows.push(row?);
    }

    if rows.is_empty() {
        return Err(GoalSheetError::Empty);
    }
    Ok(rows)
}

pub fn goal_sheet_from_path(path: impl AsRef<Path>) -> Result<Vec<GoalSheetRow>, GoalSheetError> {
    let file = File::open(path)?;
    parse_goal_sheet(file)
}

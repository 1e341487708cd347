//! KPI evaluation and salary-adjustment engine for the HR administration
//! service. The `workflows::kpi` module carries the business logic; the rest
//! of the crate is the operational shell (configuration, telemetry, HTTP
//! error mapping) around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

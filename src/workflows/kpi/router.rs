use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Datelike, Local};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EmployeeId, EvaluationId, EvaluationPeriod};
use super::repository::{
    CompletionRateSource, DraftRepository, EmployeeDirectory, EvaluationRepository,
    RepositoryError,
};
use super::service::{
    CreateEvaluationRequest, CrossCheckRequest, DepartmentCycleRequest, EngineError,
    KpiEvaluationService,
};

/// Router builder exposing the KPI engine operations over HTTP.
pub fn kpi_router<R, D>(service: Arc<KpiEvaluationService<R, D>>) -> Router
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    Router::new()
        .route("/api/v1/kpi/evaluations", post(create_handler::<R, D>))
        .route(
            "/api/v1/kpi/evaluations/:evaluation_id",
            get(get_handler::<R, D>),
        )
        .route(
            "/api/v1/kpi/evaluations/:evaluation_id/cross-check",
            post(cross_check_handler::<R, D>),
        )
        .route(
            "/api/v1/kpi/employees/:employee_id/salary-suggestion",
            get(salary_suggestion_handler::<R, D>),
        )
        .route(
            "/api/v1/kpi/departments/:department/evaluations",
            post(generate_handler::<R, D>),
        )
        .route(
            "/api/v1/kpi/departments/:department/draft",
            put(draft_handler::<R, D>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateEvaluationPayload {
    employee_id: String,
    period: EvaluationPeriod,
    cycle: String,
    #[serde(default)]
    score_p1: u32,
    #[serde(default)]
    score_p2: u32,
    #[serde(default)]
    score_p3: u32,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    criteria_scores: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    is_self_assessment: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CrossCheckPayload {
    score_p1: u32,
    score_p2: u32,
    score_p3: u32,
    #[serde(default)]
    notes: String,
    evaluated_by: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DepartmentCyclePayload {
    period: EvaluationPeriod,
    cycle: String,
    #[serde(default)]
    actuals: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SalarySuggestionQuery {
    year: Option<i32>,
}

pub(crate) async fn create_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    axum::Json(payload): axum::Json<CreateEvaluationPayload>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    let request = CreateEvaluationRequest {
        employee_id: EmployeeId(payload.employee_id),
        period: payload.period,
        cycle: payload.cycle,
        score_p1: payload.score_p1,
        score_p2: payload.score_p2,
        score_p3: payload.score_p3,
        notes: payload.notes,
        criteria_scores: payload.criteria_scores,
        is_self_assessment: payload.is_self_assessment,
    };

    match service.create_evaluation(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    match service.get(&EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cross_check_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(payload): axum::Json<CrossCheckPayload>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    let request = CrossCheckRequest {
        evaluation_id: EvaluationId(evaluation_id),
        score_p1: payload.score_p1,
        score_p2: payload.score_p2,
        score_p3: payload.score_p3,
        notes: payload.notes,
        evaluated_by: payload.evaluated_by,
    };

    match service.submit_cross_check(request) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn salary_suggestion_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    Path(employee_id): Path<String>,
    Query(query): Query<SalarySuggestionQuery>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    let year = query.year.unwrap_or_else(|| Local::now().year());
    match service.suggest_salary_increase(&EmployeeId(employee_id), year) {
        Ok(suggestion) => (StatusCode::OK, axum::Json(json!({ "suggestion": suggestion })))
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn generate_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    Path(department): Path<String>,
    axum::Json(payload): axum::Json<DepartmentCyclePayload>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    let request = DepartmentCycleRequest {
        department,
        period: payload.period,
        cycle: payload.cycle,
        actuals: payload.actuals,
    };

    // HTTP callers get no cancellation handle; the flag exists for embedders
    // driving long department runs programmatically.
    let cancel = AtomicBool::new(false);
    match service.generate_department_evaluations(request, &cancel) {
        Ok(affected) => (StatusCode::OK, axum::Json(json!({ "affected": affected })))
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn draft_handler<R, D>(
    State(service): State<Arc<KpiEvaluationService<R, D>>>,
    Path(department): Path<String>,
    axum::Json(payload): axum::Json<DepartmentCyclePayload>,
) -> Response
where
    R: EvaluationRepository + DraftRepository + 'static,
    D: EmployeeDirectory + CompletionRateSource + 'static,
{
    let request = DepartmentCycleRequest {
        department,
        period: payload.period,
        cycle: payload.cycle,
        actuals: payload.actuals,
    };

    match service.save_department_draft(request) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EngineError) -> Response {
    let status = match &error {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidState(_) => StatusCode::CONFLICT,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EngineError::Repository(_) | EngineError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use hr_kpi_engine::config::AppConfig;
use hr_kpi_engine::error::AppError;
use hr_kpi_engine::telemetry;
use hr_kpi_engine::workflows::kpi::{
    achievement_rate, goal_achievement, goal_sheet_from_path, parse_goal_sheet, GoalOutcome,
    GoalSheetRow,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "HR KPI Engine",
    about = "Run the KPI evaluation and salary-adjustment engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Department goal tooling
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum GoalsCommand {
    /// Preview the projected department score from a goal sheet CSV
    Preview(GoalsPreviewArgs),
}

#[derive(Args, Debug)]
struct GoalsPreviewArgs {
    /// Goal sheet CSV with columns goal,target,weight,actual
    #[arg(long)]
    sheet: PathBuf,
}

#[derive(Debug, Deserialize)]
struct GoalPreviewRequest {
    #[serde(default)]
    goals: Option<Vec<GoalSheetRow>>,
    #[serde(default)]
    sheet_csv: Option<String>,
}

#[derive(Debug, Serialize)]
struct GoalPreviewResponse {
    projected_score: u32,
    goals: Vec<GoalPreviewEntry>,
}

#[derive(Debug, Serialize)]
struct GoalPreviewEntry {
    name: String,
    target: f64,
    weight: u32,
    actual: f64,
    capped_rate: f64,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Goals {
            command: GoalsCommand::Preview(args),
        } => run_goals_preview(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/kpi/goal-preview", post(goal_preview_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "kpi evaluation engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_goals_preview(args: GoalsPreviewArgs) -> Result<(), AppError> {
    let rows = goal_sheet_from_path(&args.sheet)?;
    render_goal_preview(&rows);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn goal_preview_endpoint(
    Json(payload): Json<GoalPreviewRequest>,
) -> Result<Json<GoalPreviewResponse>, AppError> {
    let GoalPreviewRequest { goals, sheet_csv } = payload;

    let rows = match (goals, sheet_csv) {
        (Some(rows), _) => rows,
        (None, Some(csv)) => parse_goal_sheet(Cursor::new(csv.into_bytes()))?,
        (None, None) => Vec::new(),
    };

    let outcomes: Vec<GoalOutcome> = rows.iter().map(GoalSheetRow::outcome).collect();
    let projected_score = goal_achievement(&outcomes);

    let goals = rows
        .into_iter()
        .map(|row| {
            let capped_rate = achievement_rate(row.target, row.actual);
            GoalPreviewEntry {
                name: row.name,
                target: row.target,
                weight: row.weight,
                actual: row.actual,
                capped_rate,
            }
        })
        .collect();

    Ok(Json(GoalPreviewResponse {
        projected_score,
        goals,
    }))
}

fn render_goal_preview(rows: &[GoalSheetRow]) {
    let outcomes: Vec<GoalOutcome> = rows.iter().map(GoalSheetRow::outcome).collect();
    let projected = goal_achievement(&outcomes);

    println!("Department goal preview");
    for row in rows {
        println!(
            "- {}: actual {} / target {} -> {:.0}% (weight {})",
            row.name,
            row.actual,
            row.target,
            achievement_rate(row.target, row.actual),
            row.weight
        );
    }
    println!("\nProjected department score: {projected}");
}

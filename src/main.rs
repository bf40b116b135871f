use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use hiredesk::config::AppConfig;
use hiredesk::error::AppError;
use hiredesk::hiring::domain::{Role, User, UserId};
use hiredesk::hiring::repository::HiringRepository;
use hiredesk::hiring::{hiring_router, HiringService, InMemoryHiringRepository};
use hiredesk::intake::scanner::ClamdScanner;
use hiredesk::intake::spam::{SpamCheckInput, SpamFilter};
use hiredesk::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "hiredesk",
    about = "Applicant tracking service with spam and upload screening",
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
    /// Intake pipeline utilities
    Intake {
        #[command(subcommand)]
        command: IntakeCommand,
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
enum IntakeCommand {
    /// Run the spam heuristic against a submission without persisting it
    SpamCheck(SpamCheckArgs),
}

#[derive(Args, Debug)]
struct SpamCheckArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    cover_letter: Option<String>,
    /// Value of the hidden honeypot field, if the client filled it
    #[arg(long)]
    honeypot: Option<String>,
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
        Command::Intake {
            command: IntakeCommand::SpamCheck(args),
        } => run_spam_check(args),
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
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(InMemoryHiringRepository::new());
    seed_bootstrap_admin(&repository, &config.security.secret_key)?;

    let scanner = Arc::new(ClamdScanner::new(config.scanner.clone()));
    let service = Arc::new(HiringService::new(
        repository,
        scanner,
        config.uploads.root.clone(),
    ));
    service.uploads().ensure_directories().await?;

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state)
        .merge(hiring_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring service ready");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Until the first real admin is created through the API, the configured
/// secret key acts as the bootstrap bearer token.
fn seed_bootstrap_admin(
    repository: &InMemoryHiringRepository,
    secret_key: &str,
) -> Result<(), AppError> {
    repository
        .insert_user(User {
            id: UserId::random(),
            name: "Bootstrap Admin".to_string(),
            email: "admin@hiredesk.local".to_string(),
            role: Role::Admin,
            token: secret_key.to_string(),
            active: true,
            created_at: Utc::now(),
        })
        .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))?;
    info!("bootstrap admin seeded, authenticate with the configured secret key");
    Ok(())
}

fn run_spam_check(args: SpamCheckArgs) -> Result<(), AppError> {
    let filter = SpamFilter;
    let verdict = filter.evaluate(
        SpamCheckInput {
            first_name: &args.first_name,
            last_name: &args.last_name,
            email: &args.email,
            cover_letter: args.cover_letter.as_deref(),
            honeypot: args.honeypot.as_deref(),
        },
        None,
    );

    let payload = json!({
        "spam": verdict.spam,
        "reasons": verdict.reasons,
    });
    println!("{}", serde_json::to_string_pretty(&payload).map_err(std::io::Error::other)?);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

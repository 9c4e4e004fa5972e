//! RepoChart Server
//!
//! Axum server exposing chart generation over HTTP, wired to the
//! `ChartService` from crates/core.

mod api;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use repochart_core::reasoning::{RadkitReasoning, ResilientReasoning};
use repochart_core::{ChartRequest, ChartService, Settings};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};

use api::analytics::{AnalyticsRequest, AnalyticsResponse};
use api::{analytics_routes, ErrorResponse};

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "repochart_server=info,repochart_core=info,tower_http=info";

type Service = ChartService<ResilientReasoning<RadkitReasoning>>;

/// Application state
pub struct AppState {
    service: Service,
}

pub type SharedState = Arc<AppState>;

#[derive(Parser)]
#[command(name = "repochart", version, about = "Chart generation for GitHub repositories")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Generate one chart and print it (CLI mode, no server)
    Run {
        /// Repository owner
        #[arg(long)]
        owner: String,
        /// Repository name
        #[arg(long)]
        repo: String,
        /// GitHub token
        #[arg(long)]
        token: String,
        /// What the chart should show
        message: String,
    },
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    status: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RepoChart API",
        version = "1.0.0",
        description = "Chart generation for GitHub repositories"
    ),
    paths(api::analytics::generate_chart, healthz),
    components(schemas(AnalyticsRequest, AnalyticsResponse, ErrorResponse, HealthResponse)),
    tags(
        (name = "analytics", description = "Chart generation"),
        (name = "health", description = "Liveness")
    )
)]
struct ApiDoc;

/// Liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn hello() -> &'static str {
    "Hello from RepoChart"
}

async fn serve_openapi() -> impl IntoResponse {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => Response::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(spec))
            .unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/healthz", get(healthz))
        .route("/v1/openapi.json", get(serve_openapi))
        .nest("/v1", analytics_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Server Entry ===

async fn run_server(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state: SharedState = Arc::new(AppState {
        service: ChartService::from_settings(&settings)?,
    });

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!(%addr, "RepoChart server listening");
    tracing::info!("Routes: POST /v1/analytics, GET /healthz, GET /v1/openapi.json");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn run_once(settings: Settings, request: ChartRequest, token: &str) -> anyhow::Result<()> {
    let service = ChartService::from_settings(&settings)?;
    match service.generate(request, token).await {
        Ok(response) => {
            println!("{}", response.code);
            if !response.explanation.is_empty() {
                eprintln!("{}", response.explanation);
            }
            Ok(())
        }
        Err(e) => anyhow::bail!("chart generation failed: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    match args.command {
        Some(CliCommand::Run {
            owner,
            repo,
            token,
            message,
        }) => {
            let request = ChartRequest {
                message,
                owner,
                repo,
            };
            run_once(settings, request, &token).await
        }
        Some(CliCommand::Serve { host, port }) => run_server(settings, &host, port).await,
        None => run_server(settings, "127.0.0.1", 8080).await,
    }
}

//! Compliance Suite Server
//!
//! HTTP front end for the document compliance engine. Provides REST API
//! endpoints for:
//!
//! - Document scanning against the GDPR/HIPAA catalog (PDF or plain text)
//! - Catalog listing
//! - Prompt proxying to the Gemini text-completion API
//!
//! ## Architecture
//!
//! The regulation catalog is built once at startup and shared read-only by
//! every request. Uploaded documents are converted to text by `shared-pdf`,
//! scanned by `compliance-engine`, and returned in the scan response shape
//! the UI renders directly.
//!
//! - Per-IP rate limiting via tower-governor
//! - CORS restricted to the configured UI origins
//! - Upload size cap enforced before extraction

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use clap::Parser;
use compliance_engine::ComplianceEngine;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod gemini;

use api::{handle_health, handle_list_catalog, handle_prompt, handle_scan_document};
use gemini::{GeminiClient, GeminiConfig};

/// Extra room for multipart boundaries and headers on top of the file cap
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Command-line arguments for the compliance server
#[derive(Parser, Debug)]
#[command(name = "compliance-server")]
#[command(about = "Document compliance scanning server (GDPR, HIPAA)")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Maximum accepted document size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = shared_pdf::MAX_DOCUMENT_BYTES)]
    max_upload_bytes: usize,

    /// Allowed CORS origins (comma separated, "*" for any)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173"
    )]
    allowed_origins: Vec<String>,

    /// Gemini API key; the prompt proxy answers 500 without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = gemini::DEFAULT_MODEL)]
    gemini_model: String,

    /// Gemini API root
    #[arg(long, env = "GEMINI_BASE_URL", default_value = gemini::DEFAULT_BASE_URL)]
    gemini_base_url: String,

    /// Provider request timeout in seconds
    #[arg(long, env = "GEMINI_TIMEOUT_SECS", default_value = "30")]
    gemini_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: ComplianceEngine,
    pub gemini: Option<Arc<GeminiClient>>,
    pub max_upload_bytes: usize,
}

/// Routes and request-shaping layers, without the network-facing
/// middleware added in `main`
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        // Health check
        .route("/api/health", get(handle_health))
        // Compliance endpoints
        .route("/api/compliance/catalog", get(handle_list_catalog))
        .route("/api/compliance/scan", post(handle_scan_document))
        // Prompt proxy
        .route("/api/gemini", post(handle_prompt))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Burst allowance on top of the steady per-second rate
fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting compliance server on {}:{}", args.host, args.port);

    // Catalog errors are authoring defects: refuse to start.
    let engine = ComplianceEngine::with_reference_catalog()
        .context("Failed to build regulation catalog")?;
    info!(
        "Loaded catalog {} ({} regulations, {} clauses)",
        engine.catalog().version(),
        engine.catalog().regulations().len(),
        engine.catalog().clause_count()
    );

    let gemini = match args.gemini_api_key.filter(|k| !k.trim().is_empty()) {
        Some(api_key) => {
            let config = GeminiConfig {
                api_key,
                model: args.gemini_model,
                base_url: args.gemini_base_url,
                timeout_secs: args.gemini_timeout_secs,
            };
            Some(Arc::new(GeminiClient::new(config)?))
        }
        None => {
            warn!("GEMINI_API_KEY not set; /api/gemini will report a misconfiguration");
            None
        }
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(burst_size(args.rate_limit))
            .finish()
            .ok_or_else(|| anyhow!("Invalid rate limit configuration"))?,
    );

    // Create shared state
    let state = AppState {
        engine,
        gemini,
        max_upload_bytes: args.max_upload_bytes,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&args.allowed_origins)?)
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Upload limit: {} bytes", args.max_upload_bytes);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

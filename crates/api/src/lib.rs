//! # Rollcall API
//!
//! The API crate exposes the scheduling services over HTTP.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into service calls
//! - **Middleware**: Tenant extraction and error-to-status mapping
//! - **Config**: Environment-driven server configuration
//!
//! Admin routes under `/api/schedules` and `/api/collections` act for the
//! tenant named in the `X-Tenant-Id` header. Routes under `/api/public` are
//! addressed by a schedule's public token.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Tenant extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use eyre::{Result, WrapErr};
use rollcall_core::{
    repositories::{Clock, MemberGroupRepository, SystemClock, TransactionManager},
    services::{
        conversion::AttendanceConverter, response::ResponseCollector, schedule::ScheduleService,
    },
};
use rollcall_db::{DbPool, PgMemberGroupRepository, PgTransactionManager};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use middleware::tenant::TENANT_HEADER;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub schedules: ScheduleService,
    pub responses: ResponseCollector,
    pub converter: AttendanceConverter,
}

impl ApiState {
    /// Wires every service onto the same transaction manager and clock.
    pub fn new(
        tx: Arc<dyn TransactionManager>,
        groups: Arc<dyn MemberGroupRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules: ScheduleService::new(tx.clone(), clock.clone()),
            responses: ResponseCollector::new(tx.clone(), clock.clone()),
            converter: AttendanceConverter::new(tx, groups, clock),
        }
    }

    /// State backed by PostgreSQL and the wall clock.
    pub fn from_pool(db_pool: DbPool) -> Self {
        Self::new(
            Arc::new(PgTransactionManager::new(db_pool.clone())),
            Arc::new(PgMemberGroupRepository::new(db_pool)),
            Arc::new(SystemClock),
        )
    }
}

/// Builds the application router with every route attached to `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Schedule administration endpoints
        .merge(routes::schedule::routes())
        // Conversion and collection endpoints
        .merge(routes::attendance::routes())
        // Token-addressed endpoints
        .merge(routes::public::routes())
        .with_state(state)
}

/// Starts the API server
///
/// Installs the tracing subscriber, builds the PostgreSQL-backed state,
/// applies CORS, tracing and timeout layers and serves until shutdown.
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = rollcall_api::config::ApiConfig::from_env()?;
/// let db_pool = rollcall_db::create_pool(&config.database_url, config.max_connections).await?;
/// rollcall_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging; RUST_LOG overrides LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .wrap_err("Invalid LOG_LEVEL value")?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::from_pool(db_pool));
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS value")?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static(TENANT_HEADER),
            ])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

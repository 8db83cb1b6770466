//! Timecard API Server
//!
//! User management and daily attendance (check-in/check-out) over HTTP and RPC.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;
mod rpc;

#[cfg(test)]
mod test_utils;


use adapters::{SqlAttendanceRepository, SqlUserRepository};
use app::{AttendanceService, UserService};
use config::Config;
use domain::ports::{AttendanceRepository, UserRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<dyn UserRepository>>,
    pub attendance_service: Arc<AttendanceService<dyn AttendanceRepository, dyn UserRepository>>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP and RPC routes.
///
/// Requests running past `request_timeout` are dropped, which cancels the
/// in-flight service call, and answered with 408.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Users
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Attendance
        .route("/users/:id/attendance/check-in", post(handlers::check_in))
        .route("/users/:id/attendance/check-out", post(handlers::check_out))
        .route(
            "/users/:id/attendance/:year/:month",
            get(handlers::get_monthly_attendance).put(handlers::update_monthly_attendance),
        )
        .route(
            "/users/:id/attendance/:year/:month/summary",
            get(handlers::get_monthly_summary),
        )
        .route("/attendance", get(handlers::list_attendance))
        // RPC surface
        .merge(rpc::routes())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,timecard_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Timecard API...");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Connect to the database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    adapters::sql::migrate(&db)
        .await
        .context("Failed to create tables")?;
    tracing::info!("Database connected");

    // Create adapters
    let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(db.clone()));
    let attendance_repo: Arc<dyn AttendanceRepository> =
        Arc::new(SqlAttendanceRepository::new(db.clone()));

    // Create application services
    let user_service = Arc::new(UserService::new(user_repo.clone()));
    let attendance_service = Arc::new(AttendanceService::new(
        attendance_repo,
        user_repo,
        config.policy(),
    ));

    let state = AppState {
        user_service,
        attendance_service,
    };

    let app = router(state, config.request_timeout);

    // Start server
    tracing::info!(
        cutoff = %config.late_cutoff,
        offset = %config.utc_offset,
        "Listening on {}",
        config.listen_addr
    );
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await.context("Failed to close database")?;

    Ok(())
}

//! Route definitions for the Imasu HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(account_routes())
        .merge(member_routes())
        .merge(attendance_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Registration and token issuance
fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(handlers::account::create_account).get(handlers::member::list_members),
        )
        .route("/token", post(handlers::account::issue_token))
}

/// The acting member's profile
fn member_routes() -> Router<AppState> {
    Router::new().route(
        "/users/me",
        get(handlers::member::get_me).put(handlers::member::update_me),
    )
}

/// Presence actions and history
fn attendance_routes() -> Router<AppState> {
    Router::new().route(
        "/users/me/logs",
        post(handlers::attendance::create_log).get(handlers::attendance::list_logs),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

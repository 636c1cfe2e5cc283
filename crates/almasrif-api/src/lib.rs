pub mod auth;
pub mod dashboard;
pub mod error;
pub mod excellent;
pub mod leaderboard;
pub mod middleware;
pub mod ranking;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// All routes, public and protected. Transport layers (CORS, tracing) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/excellent", get(excellent::get_excellent))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> &'static str {
    "ok"
}

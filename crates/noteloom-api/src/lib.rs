pub mod auth;
pub mod dashboard;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod throttle;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::auth::AppState;
use crate::middleware::require_auth;
use crate::throttle::throttle;

/// Every route of the service. Cross-cutting layers (CORS, tracing) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route("/notes/create", get(notes::create_form))
        .route("/notes/{id}", put(notes::update_note).delete(notes::delete_note))
        .route("/notes/{id}/edit", get(notes::edit_form))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), throttle))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

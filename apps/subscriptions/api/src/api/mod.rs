use axum::{Router, routing::get};

pub mod health;
pub mod subscriptions;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/v1/subscriptions", subscriptions::router(state))
}

/// `/ready` with a real database check, served at the root next to `/health`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

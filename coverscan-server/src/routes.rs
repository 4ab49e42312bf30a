use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{AppState, artifacts, form, runs};

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form::index))
        .route("/runs", post(runs::start_run))
        .route("/runs/{id}", get(runs::run_status))
        .route(
            "/output/{library}/{file}",
            get(artifacts::serve).delete(artifacts::delete),
        )
        .route("/download/{library}/{file}", get(artifacts::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! PDF Toolbox API: account/usage tracking plus upload-and-transform
//! endpoints over the [`pdftoolbox_core`] engine.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod bot;
pub mod delivery;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod state;
pub mod store;

pub use state::AppState;

/// Build the application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/user/:id", get(handlers::get_user))
        .route("/user/:id", post(handlers::update_user))
        .route("/process", post(handlers::process))
        .route("/files/:name", get(handlers::get_artifact))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

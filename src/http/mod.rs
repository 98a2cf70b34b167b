//! HTTP surface.
//!
//! Route registration belongs to the application layer, not the lifecycle;
//! this module only provides the router seam the listener serves, carrying
//! the auxiliary `/health` endpoint advertised in the startup banner plus
//! baseline middleware.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Build the service router.
pub fn build_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

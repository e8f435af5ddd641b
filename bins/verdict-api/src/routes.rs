use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/execute", post(handlers::execute_code))
        .route("/execute/tests", post(handlers::execute_tests))
        .route("/execute/tests/interpreted", post(handlers::execute_tests_interpreted))
        .route("/languages", get(handlers::list_languages))
        .route("/languages/:name", get(handlers::get_language))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::export_metrics))
}

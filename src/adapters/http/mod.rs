pub mod routes;
pub mod state;
pub mod ws;

use axum::{routing::{get, post}, Router};
use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/config", get(routes::get_config))
        .route("/api/detection/start", post(routes::start_detection))
        .route("/api/detection/stop", post(routes::stop_detection))
        .route("/api/detection/status", get(routes::detection_status))
        .route("/api/stats", get(routes::get_stats))
        .route("/api/detections", get(routes::list_detections))
        .route("/api/categories", get(routes::list_categories))
        .route("/api/classify", get(routes::classify_label))
        .route("/api/snapshot", get(routes::snapshot))
        .route("/ws/stream", get(ws_handler))
        .with_state(state)
}

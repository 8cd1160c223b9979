use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::adapters::http::state::HttpState;
use crate::domain::{errors::DomainError, waste::WasteCategory};

const SNAPSHOT_QUALITY: u8 = 80;

#[derive(Deserialize)]
pub struct ClassifyQuery { label: Option<String> }

fn error_response(e: DomainError) -> Response {
    let status = match &e {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::OperationFailed(_) => StatusCode::CONFLICT,
        DomainError::Capture(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::ModelLoad(_) | DomainError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "app": &*st.config,
        "detector": st.session.params(),
    }))
}

pub async fn start_detection(State(st): State<HttpState>) -> impl IntoResponse {
    match st.session.start().await {
        Ok(()) => Json(json!({ "ok": true, "state": st.session.state() })).into_response(),
        Err(e) => {
            error!("No se pudo iniciar la detección: {}", e);
            error_response(e)
        }
    }
}

pub async fn stop_detection(State(st): State<HttpState>) -> impl IntoResponse {
    st.session.stop();
    Json(json!({ "ok": true, "state": st.session.state() }))
}

pub async fn detection_status(State(st): State<HttpState>) -> impl IntoResponse {
    Json(json!({ "state": st.session.state(), "stats": st.session.stats() }))
}

pub async fn get_stats(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.session.stats())
}

pub async fn list_detections(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.session.records())
}

pub async fn list_categories() -> impl IntoResponse {
    let bins: Vec<_> = WasteCategory::ALL.iter().map(|c| c.bin()).collect();
    Json(bins)
}

pub async fn classify_label(State(st): State<HttpState>, Query(query): Query<ClassifyQuery>) -> impl IntoResponse {
    let Some(label) = query.label else {
        return error_response(DomainError::InvalidInput("falta el parámetro label".into()));
    };
    let category = st.session.classifier().classify(&label);
    Json(json!({
        "label": label.to_lowercase(),
        "category": category,
        "bin": category.bin(),
    }))
    .into_response()
}

pub async fn snapshot(State(st): State<HttpState>) -> impl IntoResponse {
    let session = st.session.clone();
    let jpeg = tokio::task::spawn_blocking(move || session.capture_image(SNAPSHOT_QUALITY))
        .await
        .map_err(|e| DomainError::OperationFailed(e.to_string()))
        .and_then(|r| r);

    match jpeg {
        Ok(jpeg) => ([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response(),
        Err(e) => error_response(e),
    }
}

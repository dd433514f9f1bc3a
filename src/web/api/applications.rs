//! API endpoints for job applications.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::{Listing, NewRecord, Record, RecordPatch, Store};

use super::error::ApiError;

/// File name offered to the browser for the CSV download.
pub const DOWNLOAD_FILE_NAME: &str = "job_applications.csv";

/// Response for create and update.
#[derive(Serialize, Deserialize, Debug)]
pub struct SavedResponse {
    pub message: String,
    pub application: Record,
}

/// Response carrying only a message.
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// List all applications with the total score.
pub async fn list_applications(
    State(store): State<Arc<Store>>,
) -> Result<Json<Listing>, ApiError> {
    tracing::debug!("GET /api/applications");
    Ok(Json(store.read_all()?))
}

/// Create a new application.
pub async fn create_application(
    State(store): State<Arc<Store>>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedResponse>), ApiError> {
    let Json(payload) = payload?;
    tracing::debug!("POST /api/applications: {:?}", payload);

    let application = store.create(payload)?;

    Ok((
        StatusCode::CREATED,
        Json(SavedResponse {
            message: "Application saved successfully.".to_string(),
            application,
        }),
    ))
}

/// Merge the body over an existing application.
pub async fn update_application(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
    payload: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<Json<SavedResponse>, ApiError> {
    let Json(patch) = payload?;
    tracing::debug!("PUT /api/applications/{}: {:?}", id, patch);

    let application = store.update(&id, &patch)?;

    Ok(Json(SavedResponse {
        message: "Application updated successfully.".to_string(),
        application,
    }))
}

/// Delete an application.
pub async fn delete_application(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::debug!("DELETE /api/applications/{}", id);

    store.delete(&id)?;

    Ok(Json(MessageResponse {
        message: "Application deleted successfully.".to_string(),
    }))
}

/// Download the data file as-is.
pub async fn download_csv(State(store): State<Arc<Store>>) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!("GET /api/download-csv");

    let bytes = store.export()?;
    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

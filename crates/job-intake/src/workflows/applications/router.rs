use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error};

use super::domain::{ApplicationId, SubmitResponse, APPLICATION_DATA_PART};
use super::repository::ApplicationRepository;
use super::service::{ApplicationIntakeService, IncomingDocument, IntakeServiceError};
use crate::workflows::validation::{content_type_for, DocumentSlot, MAX_UPLOAD_BYTES};

/// Request bodies may carry three full-size documents plus the JSON envelope. Oversized single
/// files still reach the validator so they are reported as upload rejections.
pub const SUBMISSION_BODY_LIMIT: usize = (3 * MAX_UPLOAD_BYTES as usize) + 1024 * 1024;

/// Router exposing submission, lookup, export, and upload download endpoints.
pub fn application_router<R>(service: Arc<ApplicationIntakeService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/submit-application",
            post(submit_handler::<R>).layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT)),
        )
        .route("/api/applications", get(list_handler::<R>))
        .route("/api/applications/:id", get(show_handler::<R>))
        .route("/api/download-applications", get(export_handler::<R>))
        .route("/uploads/:filename", get(upload_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicationIntakeService<R>>>,
    mut multipart: Multipart,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let mut application_data = None;
    let mut documents = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return rejection(err.status(), err.body_text()),
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == APPLICATION_DATA_PART {
            match field.text().await {
                Ok(text) => application_data = Some(text),
                Err(err) => return rejection(err.status(), err.body_text()),
            }
            continue;
        }

        let Some(slot) = DocumentSlot::from_field_name(&name) else {
            if field.file_name().is_some() {
                return rejection(
                    StatusCode::BAD_REQUEST,
                    format!("Unexpected file field '{name}'"),
                );
            }
            debug!(field = %name, "ignoring unrecognised multipart field");
            continue;
        };

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => documents.push(IncomingDocument {
                slot,
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            }),
            Err(err) => return rejection(err.status(), err.body_text()),
        }
    }

    let Some(application_data) = application_data else {
        return rejection(
            StatusCode::BAD_REQUEST,
            "Missing applicationData field".to_string(),
        );
    };

    let outcome =
        tokio::task::spawn_blocking(move || service.submit(&application_data, documents)).await;
    let submitted = match outcome {
        Ok(submitted) => submitted,
        Err(err) => {
            error!(error = %err, "submission task failed");
            return rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error submitting application".to_string(),
            );
        }
    };

    match submitted {
        Ok(record) => (StatusCode::OK, Json(SubmitResponse::accepted(record.id))).into_response(),
        Err(IntakeServiceError::InvalidPayload(message)) => {
            rejection(StatusCode::BAD_REQUEST, message)
        }
        Err(IntakeServiceError::Rejected(reason)) => {
            rejection(StatusCode::UNPROCESSABLE_ENTITY, reason.to_string())
        }
        Err(other) => {
            error!(error = %other, "error submitting application");
            rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error submitting application".to_string(),
            )
        }
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ApplicationIntakeService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.list() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn show_handler<R>(
    State(service): State<Arc<ApplicationIntakeService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.get(&ApplicationId(id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(IntakeServiceError::NotFound(_)) => not_found("Application not found"),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<ApplicationIntakeService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let export = match service.export(Utc::now()) {
        Ok(export) => export,
        Err(err) => return internal_error(err),
    };

    let disposition = format!("attachment; filename=\"{}\"", export.file_name());
    let mut response = (StatusCode::OK, Json(export)).into_response();
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

pub(crate) async fn upload_handler<R>(
    State(service): State<Arc<ApplicationIntakeService<R>>>,
    Path(filename): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let content_type = content_type_for(&filename);
    let lookup = tokio::task::spawn_blocking(move || service.uploads().open(&filename))
        .await
        .map_err(|err| err.to_string())
        .and_then(|opened| opened.map_err(|err| err.to_string()));

    match lookup {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            bytes,
        )
            .into_response(),
        Ok(None) => not_found("File not found"),
        Err(message) => {
            error!(error = %message, "failed to read upload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

fn rejection(status: StatusCode, message: String) -> Response {
    (status, Json(SubmitResponse::rejected(message))).into_response()
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
}

fn internal_error(err: IntakeServiceError) -> Response {
    error!(error = %err, "application store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use chrono::Utc;
use serde_json::Value;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        CreateNoteRequest, ErrorResponse, HealthResponse, NoteEnvelope, NoteResponse,
        NotesListEnvelope,
    },
    service::NoteService,
    validation::{BulkAction, BulkOperationPayload, ImportPayload, NotePayload, ValidatedJson},
};

#[derive(OpenApi)]
#[openapi(
    paths(root, get_all_notes, create_note, import_notes),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        NoteEnvelope,
        NotesListEnvelope,
        ErrorResponse,
        HealthResponse,
        NotePayload,
        ImportPayload,
        BulkOperationPayload,
        BulkAction
    )),
    tags(
        (name = "notes", description = "Notes management API"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
#[debug_handler]
pub async fn root() -> Response {
    let health = HealthResponse {
        message: "API is working!".to_string(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(health)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "List of all notes", body = NotesListEnvelope)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(service): State<Arc<NoteService>>) -> Response {
    let notes = service.get_all_notes().await;
    (StatusCode::OK, Json(NotesListEnvelope::new(notes))).into_response()
}

/// Creates a note from whatever `title`/`content` the body carries.
///
/// A body sent without a JSON content type counts as `{}`. Field types are
/// not checked.
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteEnvelope),
        (status = 400, description = "Body is not valid JSON")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(body)) => CreateNoteRequest::from_json(body),
        Err(JsonRejection::MissingJsonContentType(_)) => CreateNoteRequest::default(),
        Err(rejection) => {
            tracing::warn!("rejecting create note request: {rejection}");
            return rejection.into_response();
        }
    };

    let note = service.create_note(request).await;
    (StatusCode::CREATED, Json(NoteEnvelope::new(note))).into_response()
}

/// Mounted on `POST /api/notes` in place of [`create_note`] when strict
/// creation is configured.
#[debug_handler]
pub async fn create_validated_note(
    State(service): State<Arc<NoteService>>,
    ValidatedJson(payload): ValidatedJson<NotePayload>,
) -> Response {
    let note = service.create_validated_note(payload).await;
    (StatusCode::CREATED, Json(NoteEnvelope::new(note))).into_response()
}

#[utoipa::path(
    post,
    path = "/api/notes/import",
    request_body = ImportPayload,
    responses(
        (status = 201, description = "Notes imported successfully", body = NotesListEnvelope),
        (status = 400, description = "Payload failed validation", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn import_notes(
    State(service): State<Arc<NoteService>>,
    ValidatedJson(payload): ValidatedJson<ImportPayload>,
) -> Response {
    let notes = service.import_notes(payload).await;
    (StatusCode::CREATED, Json(NotesListEnvelope::new(notes))).into_response()
}

//! In-memory notes REST API.
//!
//! Notes live in a [`repository::NoteStore`] owned by a [`service::NoteService`],
//! which axum handlers receive as shared state. Request payloads can be checked
//! against the schemas in [`validation`].

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use config::Config;
use handlers::rest;
use service::NoteService;

/// Builds the HTTP router, choosing the create handler from `config`.
pub fn build_router(service: Arc<NoteService>, config: &Config) -> Router {
    let create = if config.strict_create {
        post(rest::create_validated_note)
    } else {
        post(rest::create_note)
    };

    Router::new()
        .route("/", get(rest::root))
        .route("/api/notes", get(rest::get_all_notes).merge(create))
        .route("/api/notes/import", post(rest::import_notes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

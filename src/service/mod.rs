use crate::{
    dto::{CreateNoteRequest, NoteResponse},
    repository::NoteStore,
    validation::{ImportPayload, NotePayload},
};

use std::sync::Arc;

#[derive(Clone)]
pub struct NoteService {
    store: Arc<tokio::sync::Mutex<NoteStore>>,
}

impl NoteService {
    pub const fn new(store: Arc<tokio::sync::Mutex<NoteStore>>) -> Self {
        Self { store }
    }

    pub async fn get_all_notes(&self) -> Vec<NoteResponse> {
        self.store
            .lock()
            .await
            .list_all()
            .iter()
            .cloned()
            .map(NoteResponse::from)
            .collect()
    }

    /// Creates a note straight from the request body, without schema checks.
    pub async fn create_note(&self, request: CreateNoteRequest) -> NoteResponse {
        let note = self
            .store
            .lock()
            .await
            .append(request.title(), request.content());

        tracing::info!("Created note {}", note.id);

        note.into()
    }

    pub async fn create_validated_note(&self, payload: NotePayload) -> NoteResponse {
        let note = self
            .store
            .lock()
            .await
            .append(Some(payload.title), Some(payload.content));

        tracing::info!("Created validated note {}", note.id);

        note.into()
    }

    /// Appends every imported note under a single lock, keeping their order.
    pub async fn import_notes(&self, payload: ImportPayload) -> Vec<NoteResponse> {
        let mut store = self.store.lock().await;

        let created: Vec<NoteResponse> = payload
            .notes
            .into_iter()
            .map(|note| store.append(Some(note.title), Some(note.content)).into())
            .collect();

        tracing::info!("Imported {} notes", created.len());

        created
    }
}

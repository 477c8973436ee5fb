use chrono::Utc;

use crate::models::Note;

pub const UNTITLED: &str = "Untitled";

/// In-memory, insertion-ordered note storage.
///
/// Not synchronized on its own; share it through [`crate::service::NoteService`].
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    /// Store holding the two notes every fresh process starts with.
    ///
    /// Seeded notes carry no creation time.
    pub fn seeded() -> Self {
        let seed = |id, title: &str, content: &str| Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: None,
        };

        Self {
            notes: vec![
                seed(1, "First Note", "This is my first note"),
                seed(2, "Second Note", "This is another note"),
            ],
        }
    }

    pub const fn empty() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn list_all(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Appends a note with the next sequential id.
    ///
    /// Missing or empty titles become `"Untitled"`; missing content becomes empty.
    #[allow(clippy::cast_possible_wrap)]
    pub fn append(&mut self, title: Option<String>, content: Option<String>) -> Note {
        let note = Note {
            id: self.notes.len() as i64 + 1,
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            content: content.unwrap_or_default(),
            created_at: Some(Utc::now()),
        };

        self.notes.push(note.clone());
        note
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::seeded()
    }
}

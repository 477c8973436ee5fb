use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Sequential, starting at 1

    pub id: i64,
    pub title: String,
    pub content: String,
    /// Unset for the notes a fresh process is seeded with
    pub created_at: Option<DateTime<Utc>>,
}

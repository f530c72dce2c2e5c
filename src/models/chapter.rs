use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A numbered chapter within a story.
///
/// (story_id, chapter_number) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub story_id: i64,
    pub title: String,
    pub chapter_number: u32,
    pub created_at: DateTime<Utc>,
}

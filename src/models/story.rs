use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root of the content tree; owns chapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

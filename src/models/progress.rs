use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per (reader, story) progress record. The viewed set itself lives in a
/// membership table; this row carries identity and the last-accessed stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub id: i64,
    pub reader_id: i64,
    pub story_id: i64,
    pub last_accessed: DateTime<Utc>,
}

/// One entry of a reader's append-only visit log.
///
/// view_order is a single strictly increasing counter per reader across
/// all stories; rows are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitLogEntry {
    pub id: i64,
    pub reader_id: i64,
    pub story_id: i64,
    pub chapter_id: i64,
    pub paragraph_id: i64,
    pub viewed_at: DateTime<Utc>,
    pub view_order: u32,
}

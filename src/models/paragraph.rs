use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest addressable unit of story content.
///
/// Position within a chapter is (page, paragraph_number), both 1-based;
/// (chapter_id, paragraph_number, page) is unique. A paragraph starts
/// locked unless created as generated continuation content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: i64,
    pub chapter_id: i64,
    pub text: String,
    pub paragraph_number: u32,
    pub page: u32,
    pub is_locked: bool,
    pub nft_owner_id: Option<i64>,
    pub text_with_links: Option<String>,
    pub created_at: DateTime<Utc>,
}

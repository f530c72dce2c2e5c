use super::Context;
use crate::error::{Result, StoryError};
use crate::{generation, pagination};
use serde_json::{json, Value};

pub fn list_page(ctx: &Context, chapter_id: i64, page: Option<u32>) -> Result<Value> {
    let conn = ctx.connection()?;
    let listing = pagination::list_page(&conn, chapter_id, page)?;

    Ok(json!({
        "results": listing.paragraphs,
        "has_next": listing.has_next,
    }))
}

pub async fn generate_paragraph(
    ctx: &Context,
    chapter_id: i64,
    page: Option<u32>,
) -> Result<Value> {
    let conn = ctx.connection()?;
    let paragraph =
        generation::generate_next_paragraph(&conn, ctx.ai(), ctx.config(), chapter_id, page)
            .await?;

    Ok(serde_json::to_value(paragraph)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize paragraph: {}", e)))?)
}

pub async fn generate_next_page(ctx: &Context, chapter_id: i64, current_page: u32) -> Result<Value> {
    let conn = ctx.connection()?;
    let paragraph =
        generation::generate_next_page(&conn, ctx.ai(), ctx.config(), chapter_id, current_page)
            .await?;

    Ok(serde_json::to_value(paragraph)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize paragraph: {}", e)))?)
}

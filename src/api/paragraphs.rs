use super::Context;
use crate::database::paragraphs;
use crate::error::{Result, StoryError};
use crate::{gate, generation, tracker};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::error;

/// Retrieves one paragraph for a reader.
///
/// A visible paragraph's retrieval is what drives progress tracking; a
/// locked one comes back with its text withheld and no view recorded.
/// Tracking failures never mask a successful read: the paragraph is
/// still returned, with view_recorded=false marking the miss.
pub fn get_paragraph(ctx: &Context, reader_id: i64, paragraph_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let paragraph = paragraphs::get(&conn, paragraph_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Paragraph {} not found", paragraph_id)))?;

    let mut body = serde_json::to_value(&paragraph)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize paragraph: {}", e)))?;

    if !gate::is_visible(&paragraph) {
        body["text"] = Value::Null;
        body["text_with_links"] = Value::Null;
        body["view_recorded"] = Value::Bool(false);
        return Ok(body);
    }

    let recorded = match tracker::record_view(&conn, reader_id, paragraph_id) {
        Ok(_) => true,
        Err(e) => {
            error!(
                "View tracking failed for reader {} paragraph {}: {}",
                reader_id, paragraph_id, e
            );
            false
        }
    };

    body["view_recorded"] = Value::Bool(recorded);
    Ok(body)
}

pub fn unlock_paragraph(
    ctx: &Context,
    reader_id: i64,
    paragraph_id: i64,
    amount: Option<Decimal>,
) -> Result<Value> {
    let conn = ctx.connection()?;
    gate::unlock(&conn, reader_id, paragraph_id, amount)?;

    Ok(json!({"detail": "Paragraph unlocked successfully"}))
}

pub async fn annotate_paragraph(ctx: &Context, paragraph_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let html = generation::annotate_links(&conn, ctx.ai(), ctx.config(), paragraph_id).await?;

    Ok(json!({"text_with_links": html}))
}

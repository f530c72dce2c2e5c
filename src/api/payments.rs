use super::Context;
use crate::database::payments;
use crate::error::{Result, StoryError};
use serde_json::Value;

/// A reader's own payment history; always scoped to the caller.
pub fn list_payments(ctx: &Context, reader_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let history = payments::list_by_reader(&conn, reader_id)?;

    Ok(serde_json::to_value(history)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize payments: {}", e)))?)
}

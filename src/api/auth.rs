use super::Context;
use crate::auth;
use crate::error::{Result, StoryError};
use serde_json::Value;

pub async fn login(ctx: &Context, email: &str) -> Result<Value> {
    let conn = ctx.connection()?;
    let wallet = ctx.wallet()?;
    let outcome = auth::login(&conn, wallet, email).await?;

    Ok(serde_json::to_value(outcome)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize login: {}", e)))?)
}

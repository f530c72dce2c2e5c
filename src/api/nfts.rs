use super::Context;
use crate::database::nfts;
use crate::error::{Result, StoryError};
use crate::{gate, revenue};
use serde_json::{json, Value};

pub fn list_nfts(ctx: &Context, reader_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let owned = nfts::list_by_owner(&conn, reader_id)?;

    Ok(serde_json::to_value(owned)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize NFTs: {}", e)))?)
}

/// Revenue total for one of the caller's own tokens. Someone else's
/// token is indistinguishable from a missing one.
pub fn nft_revenue(ctx: &Context, reader_id: i64, nft_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let nft = nfts::get(&conn, nft_id)?
        .filter(|n| n.owner_id == reader_id)
        .ok_or_else(|| StoryError::NotFound(format!("NFT {} not found", nft_id)))?;

    let total = revenue::revenue_of(&conn, nft.id)?;
    Ok(json!({"revenue": total}))
}

pub async fn mint_nft(ctx: &Context, reader_id: i64, paragraph_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let wallet = ctx.wallet()?;
    let nft = gate::mint_nft(&conn, wallet, ctx.config(), reader_id, paragraph_id).await?;

    Ok(serde_json::to_value(nft)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize NFT: {}", e)))?)
}

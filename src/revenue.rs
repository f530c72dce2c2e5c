use crate::database::{nfts, payments};
use crate::error::{Result, StoryError};
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Total revenue accrued against an owned paragraph: the exact sum of all
/// successful payment amounts for the NFT's paragraph, zero when none.
pub fn revenue_of(conn: &Connection, nft_id: i64) -> Result<Decimal> {
    let nft = nfts::get(conn, nft_id)?
        .ok_or_else(|| StoryError::NotFound(format!("NFT {} not found", nft_id)))?;

    Ok(payments::sum_successful_for_paragraph(conn, nft.paragraph_id)?)
}

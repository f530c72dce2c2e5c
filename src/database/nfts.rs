use crate::models::Nft;
use chrono::Utc;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NftStoreError {
    #[error("NFT not found")]
    NotFound,
    #[error("Stored revenue share is not a decimal: {0}")]
    BadShare(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Nft> {
    let raw: String = row.get(4)?;
    let revenue_share = raw
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Nft {
        id: row.get(0)?,
        paragraph_id: row.get(1)?,
        owner_id: row.get(2)?,
        mint_date: row.get(3)?,
        revenue_share,
    })
}

/// Records a minted NFT. The UNIQUE constraint on paragraph_id enforces
/// the one-token-per-paragraph invariant.
pub fn insert(
    conn: &Connection,
    paragraph_id: i64,
    owner_id: i64,
    revenue_share: Decimal,
) -> Result<Nft, NftStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO nfts (paragraph_id, owner_id, mint_date, revenue_share)
         VALUES (?1, ?2, ?3, ?4)",
        params![paragraph_id, owner_id, now, revenue_share.to_string()],
    )?;

    Ok(Nft {
        id: conn.last_insert_rowid(),
        paragraph_id,
        owner_id,
        mint_date: now,
        revenue_share,
    })
}

/// Gets an NFT by ID
///
/// Returns None if the NFT doesn't exist.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Nft>, NftStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, paragraph_id, owner_id, mint_date, revenue_share
         FROM nfts
         WHERE id = ?1",
    )?;

    let nfts = stmt
        .query_map(params![id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(nfts.into_iter().next())
}

/// Gets the NFT bound to a paragraph, if one has been minted.
pub fn get_by_paragraph(
    conn: &Connection,
    paragraph_id: i64,
) -> Result<Option<Nft>, NftStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, paragraph_id, owner_id, mint_date, revenue_share
         FROM nfts
         WHERE paragraph_id = ?1",
    )?;

    let nfts = stmt
        .query_map(params![paragraph_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(nfts.into_iter().next())
}

/// Lists NFTs owned by a reader, newest mint first.
pub fn list_by_owner(conn: &Connection, owner_id: i64) -> Result<Vec<Nft>, NftStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, paragraph_id, owner_id, mint_date, revenue_share
         FROM nfts
         WHERE owner_id = ?1
         ORDER BY mint_date DESC, id DESC",
    )?;

    let nfts = stmt
        .query_map(params![owner_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(nfts)
}

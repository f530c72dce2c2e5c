use crate::models::Reader;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderStoreError {
    #[error("Reader not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Reader> {
    Ok(Reader {
        id: row.get(0)?,
        email: row.get(1)?,
        wallet_address: row.get(2)?,
        wallet_chain: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Inserts a new reader with an empty wallet. Wallet fields are filled in
/// once provisioning succeeds; callers roll the row back when it doesn't.
pub fn insert(conn: &Connection, email: &str) -> Result<Reader, ReaderStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO readers (email, wallet_address, wallet_chain, created_at)
         VALUES (?1, '', '', ?2)",
        params![email, now],
    )?;

    Ok(Reader {
        id: conn.last_insert_rowid(),
        email: email.to_string(),
        wallet_address: String::new(),
        wallet_chain: String::new(),
        created_at: now,
    })
}

/// Gets a reader by ID
///
/// Returns None if the reader doesn't exist.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Reader>, ReaderStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, wallet_address, wallet_chain, created_at
         FROM readers
         WHERE id = ?1",
    )?;

    let readers = stmt
        .query_map(params![id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(readers.into_iter().next())
}

/// Gets a reader by email (the identity key).
pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<Reader>, ReaderStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, wallet_address, wallet_chain, created_at
         FROM readers
         WHERE email = ?1",
    )?;

    let readers = stmt
        .query_map(params![email], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(readers.into_iter().next())
}

/// Records the provisioned wallet on a reader.
pub fn set_wallet(
    conn: &Connection,
    id: i64,
    address: &str,
    chain: &str,
) -> Result<(), ReaderStoreError> {
    let changed = conn.execute(
        "UPDATE readers SET wallet_address = ?2, wallet_chain = ?3 WHERE id = ?1",
        params![id, address, chain],
    )?;

    if changed == 0 {
        return Err(ReaderStoreError::NotFound);
    }
    Ok(())
}

/// Deletes a reader row. Used to roll back a half-initialized account when
/// wallet provisioning fails.
pub fn delete(conn: &Connection, id: i64) -> Result<(), ReaderStoreError> {
    conn.execute("DELETE FROM readers WHERE id = ?1", params![id])?;
    Ok(())
}

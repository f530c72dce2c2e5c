use crate::models::VisitLogEntry;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisitStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<VisitLogEntry> {
    Ok(VisitLogEntry {
        id: row.get(0)?,
        reader_id: row.get(1)?,
        story_id: row.get(2)?,
        chapter_id: row.get(3)?,
        paragraph_id: row.get(4)?,
        viewed_at: row.get(5)?,
        view_order: row.get(6)?,
    })
}

/// Next view_order for a reader: max across ALL stories plus one,
/// starting at 1. Callers must hold a write transaction so that two
/// concurrent views by the same reader cannot read the same max.
pub fn next_order(conn: &Connection, reader_id: i64) -> Result<u32, VisitStoreError> {
    let max: Option<u32> = conn.query_row(
        "SELECT MAX(view_order) FROM paragraph_views WHERE reader_id = ?1",
        params![reader_id],
        |row| row.get(0),
    )?;

    Ok(max.unwrap_or(0) + 1)
}

/// Appends a visit log entry. Rows are immutable once created; the
/// UNIQUE (reader_id, view_order) constraint rejects duplicate orders.
pub fn append(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
    chapter_id: i64,
    paragraph_id: i64,
    view_order: u32,
) -> Result<VisitLogEntry, VisitStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO paragraph_views (reader_id, story_id, chapter_id, paragraph_id, viewed_at, view_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![reader_id, story_id, chapter_id, paragraph_id, now, view_order],
    )?;

    Ok(VisitLogEntry {
        id: conn.last_insert_rowid(),
        reader_id,
        story_id,
        chapter_id,
        paragraph_id,
        viewed_at: now,
        view_order,
    })
}

/// A reader's visit log for one story, ordered by view_order ascending.
pub fn list_history(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
) -> Result<Vec<VisitLogEntry>, VisitStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, reader_id, story_id, chapter_id, paragraph_id, viewed_at, view_order
         FROM paragraph_views
         WHERE reader_id = ?1 AND story_id = ?2
         ORDER BY view_order",
    )?;

    let entries = stmt
        .query_map(params![reader_id, story_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

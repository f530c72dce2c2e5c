use crate::models::ReadingProgress;
use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressStoreError {
    #[error("Reading progress not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

/// Idempotent upsert of the (reader, story) progress row.
///
/// On a unique-key collision the existing row is kept and its
/// last_accessed stamp refreshed; the (possibly pre-existing) row is
/// returned either way.
pub fn upsert(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
) -> Result<ReadingProgress, ProgressStoreError> {
    let now = Utc::now();

    let progress = conn.query_row(
        "INSERT INTO reading_progress (reader_id, story_id, last_accessed)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (reader_id, story_id)
         DO UPDATE SET last_accessed = excluded.last_accessed
         RETURNING id, reader_id, story_id, last_accessed",
        params![reader_id, story_id, now],
        |row| {
            Ok(ReadingProgress {
                id: row.get(0)?,
                reader_id: row.get(1)?,
                story_id: row.get(2)?,
                last_accessed: row.get(3)?,
            })
        },
    )?;

    Ok(progress)
}

/// Gets the progress row for (reader, story)
///
/// Returns None if the reader has no progress in the story yet.
pub fn get(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
) -> Result<Option<ReadingProgress>, ProgressStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, reader_id, story_id, last_accessed
         FROM reading_progress
         WHERE reader_id = ?1 AND story_id = ?2",
    )?;

    let rows = stmt
        .query_map(params![reader_id, story_id], |row| {
            Ok(ReadingProgress {
                id: row.get(0)?,
                reader_id: row.get(1)?,
                story_id: row.get(2)?,
                last_accessed: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().next())
}

/// Adds a paragraph to the viewed set. Adding an already-viewed paragraph
/// is a no-op on the set; returns whether the membership row was new.
pub fn add_viewed(
    conn: &Connection,
    progress_id: i64,
    paragraph_id: i64,
) -> Result<bool, ProgressStoreError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO viewed_paragraphs (progress_id, paragraph_id) VALUES (?1, ?2)",
        params![progress_id, paragraph_id],
    )?;

    Ok(inserted > 0)
}

/// Paragraph ids in the viewed set, ascending by id (membership only; the
/// set carries no ordering semantics).
pub fn list_viewed(
    conn: &Connection,
    progress_id: i64,
) -> Result<Vec<i64>, ProgressStoreError> {
    let mut stmt = conn.prepare(
        "SELECT paragraph_id FROM viewed_paragraphs WHERE progress_id = ?1 ORDER BY paragraph_id",
    )?;

    let ids = stmt
        .query_map(params![progress_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{seed_story, test_conn};

    #[test]
    fn test_upsert_returns_same_row() {
        let conn = test_conn();
        let (story_id, _, reader_id) = seed_story(&conn);

        let first = upsert(&conn, reader_id, story_id).unwrap();
        let second = upsert(&conn, reader_id, story_id).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_upsert_refreshes_last_accessed() {
        let conn = test_conn();
        let (story_id, _, reader_id) = seed_story(&conn);

        let first = upsert(&conn, reader_id, story_id).unwrap();
        let second = upsert(&conn, reader_id, story_id).unwrap();
        assert!(second.last_accessed >= first.last_accessed);
    }

    #[test]
    fn test_viewed_set_idempotent() {
        let conn = test_conn();
        let (story_id, chapter_id, reader_id) = seed_story(&conn);
        let p = crate::database::paragraphs::insert(&conn, chapter_id, "x", 1, 1, true).unwrap();

        let progress = upsert(&conn, reader_id, story_id).unwrap();
        assert!(add_viewed(&conn, progress.id, p.id).unwrap());
        assert!(!add_viewed(&conn, progress.id, p.id).unwrap());
        assert_eq!(list_viewed(&conn, progress.id).unwrap(), vec![p.id]);
    }
}

use crate::models::Chapter;
use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChapterStoreError {
    #[error("Chapter not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

/// Inserts a new chapter.
///
/// Fails on a duplicate (story_id, chapter_number) pair.
pub fn insert(
    conn: &Connection,
    story_id: i64,
    title: &str,
    chapter_number: u32,
) -> Result<Chapter, ChapterStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO chapters (story_id, title, chapter_number, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![story_id, title, chapter_number, now],
    )?;

    Ok(Chapter {
        id: conn.last_insert_rowid(),
        story_id,
        title: title.to_string(),
        chapter_number,
        created_at: now,
    })
}

/// Lists the chapters of a story ordered by chapter_number.
pub fn list_by_story(conn: &Connection, story_id: i64) -> Result<Vec<Chapter>, ChapterStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, story_id, title, chapter_number, created_at
         FROM chapters
         WHERE story_id = ?1
         ORDER BY chapter_number",
    )?;

    let chapters = stmt
        .query_map(params![story_id], |row| {
            Ok(Chapter {
                id: row.get(0)?,
                story_id: row.get(1)?,
                title: row.get(2)?,
                chapter_number: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(chapters)
}

/// Gets a chapter by ID
///
/// Returns None if the chapter doesn't exist.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Chapter>, ChapterStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, story_id, title, chapter_number, created_at
         FROM chapters
         WHERE id = ?1",
    )?;

    let chapters = stmt
        .query_map(params![id], |row| {
            Ok(Chapter {
                id: row.get(0)?,
                story_id: row.get(1)?,
                title: row.get(2)?,
                chapter_number: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(chapters.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{stories, test_support::test_conn};

    #[test]
    fn test_chapter_numbers_unique_per_story() {
        let conn = test_conn();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        insert(&conn, story.id, "One", 1).unwrap();
        assert!(insert(&conn, story.id, "Dup", 1).is_err());

        // Same number under a different story is fine
        let other = stories::insert(&conn, "T", "", "a").unwrap();
        insert(&conn, other.id, "One", 1).unwrap();
    }

    #[test]
    fn test_list_ordered_by_number() {
        let conn = test_conn();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        insert(&conn, story.id, "Three", 3).unwrap();
        insert(&conn, story.id, "One", 1).unwrap();
        insert(&conn, story.id, "Two", 2).unwrap();

        let numbers: Vec<u32> = list_by_story(&conn, story.id)
            .unwrap()
            .iter()
            .map(|c| c.chapter_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}

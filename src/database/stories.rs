use crate::models::Story;
use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryStoreError {
    #[error("Story not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

/// Inserts a new story.
pub fn insert(
    conn: &Connection,
    title: &str,
    description: &str,
    author: &str,
) -> Result<Story, StoryStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO stories (title, description, author, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![title, description, author, now],
    )?;

    Ok(Story {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        description: description.to_string(),
        author: author.to_string(),
        created_at: now,
    })
}

/// Lists all stories, newest first.
pub fn list(conn: &Connection) -> Result<Vec<Story>, StoryStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, author, created_at
         FROM stories
         ORDER BY created_at DESC, id DESC",
    )?;

    let stories = stmt
        .query_map([], |row| {
            Ok(Story {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                author: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stories)
}

/// Gets a story by ID
///
/// Returns None if the story doesn't exist.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Story>, StoryStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, author, created_at
         FROM stories
         WHERE id = ?1",
    )?;

    let stories = stmt
        .query_map(params![id], |row| {
            Ok(Story {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                author: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stories.into_iter().next())
}

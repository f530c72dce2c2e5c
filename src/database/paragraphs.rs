use crate::models::Paragraph;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParagraphStoreError {
    #[error("Paragraph not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

const COLUMNS: &str =
    "id, chapter_id, text, paragraph_number, page, is_locked, nft_owner_id, text_with_links, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Paragraph> {
    Ok(Paragraph {
        id: row.get(0)?,
        chapter_id: row.get(1)?,
        text: row.get(2)?,
        paragraph_number: row.get(3)?,
        page: row.get(4)?,
        is_locked: row.get(5)?,
        nft_owner_id: row.get(6)?,
        text_with_links: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Inserts a new paragraph at (chapter, page, paragraph_number).
///
/// Fails on a duplicate (chapter_id, paragraph_number, page) triple.
pub fn insert(
    conn: &Connection,
    chapter_id: i64,
    text: &str,
    paragraph_number: u32,
    page: u32,
    is_locked: bool,
) -> Result<Paragraph, ParagraphStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO paragraphs (chapter_id, text, paragraph_number, page, is_locked, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![chapter_id, text, paragraph_number, page, is_locked, now],
    )?;

    Ok(Paragraph {
        id: conn.last_insert_rowid(),
        chapter_id,
        text: text.to_string(),
        paragraph_number,
        page,
        is_locked,
        nft_owner_id: None,
        text_with_links: None,
        created_at: now,
    })
}

/// Gets a paragraph by ID
///
/// Returns None if the paragraph doesn't exist.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Paragraph>, ParagraphStoreError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {} FROM paragraphs WHERE id = ?1", COLUMNS))?;

    let paragraphs = stmt
        .query_map(params![id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(paragraphs.into_iter().next())
}

/// Lists the paragraphs of one page of a chapter, ordered by paragraph_number.
pub fn list_page(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
) -> Result<Vec<Paragraph>, ParagraphStoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM paragraphs
         WHERE chapter_id = ?1 AND page = ?2
         ORDER BY paragraph_number",
        COLUMNS
    ))?;

    let paragraphs = stmt
        .query_map(params![chapter_id, page], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(paragraphs)
}

/// Existence probe for a page; does not materialize any content.
pub fn page_exists(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
) -> Result<bool, ParagraphStoreError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM paragraphs WHERE chapter_id = ?1 AND page = ?2)",
        params![chapter_id, page],
        |row| row.get::<_, bool>(0),
    )?;

    Ok(exists)
}

/// Number of paragraphs already on a page.
pub fn count_on_page(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
) -> Result<u32, ParagraphStoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM paragraphs WHERE chapter_id = ?1 AND page = ?2",
        params![chapter_id, page],
        |row| row.get::<_, u32>(0),
    )?;

    Ok(count)
}

/// Last paragraph on a page by paragraph_number, if the page has any.
pub fn last_on_page(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
) -> Result<Option<Paragraph>, ParagraphStoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM paragraphs
         WHERE chapter_id = ?1 AND page = ?2
         ORDER BY paragraph_number DESC
         LIMIT 1",
        COLUMNS
    ))?;

    let paragraphs = stmt
        .query_map(params![chapter_id, page], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(paragraphs.into_iter().next())
}

/// Highest page number in a chapter, defaulting to 1 when the chapter is empty.
pub fn last_page(conn: &Connection, chapter_id: i64) -> Result<u32, ParagraphStoreError> {
    let max: Option<u32> = conn.query_row(
        "SELECT MAX(page) FROM paragraphs WHERE chapter_id = ?1",
        params![chapter_id],
        |row| row.get(0),
    )?;

    Ok(max.unwrap_or(1))
}

/// Paragraph texts of a chapter up to and including `page`, in natural
/// (page, paragraph_number) order. Context window for generation.
pub fn texts_through_page(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
) -> Result<Vec<String>, ParagraphStoreError> {
    let mut stmt = conn.prepare(
        "SELECT text FROM paragraphs
         WHERE chapter_id = ?1 AND page <= ?2
         ORDER BY page, paragraph_number",
    )?;

    let texts = stmt
        .query_map(params![chapter_id, page], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(texts)
}

/// Clears the lock flag on a paragraph.
pub fn set_unlocked(conn: &Connection, id: i64) -> Result<(), ParagraphStoreError> {
    let changed = conn.execute("UPDATE paragraphs SET is_locked = 0 WHERE id = ?1", params![id])?;

    if changed == 0 {
        return Err(ParagraphStoreError::NotFound);
    }
    Ok(())
}

/// Records the NFT owner reference on a paragraph.
pub fn set_nft_owner(
    conn: &Connection,
    id: i64,
    owner_id: i64,
) -> Result<(), ParagraphStoreError> {
    let changed = conn.execute(
        "UPDATE paragraphs SET nft_owner_id = ?2 WHERE id = ?1",
        params![id, owner_id],
    )?;

    if changed == 0 {
        return Err(ParagraphStoreError::NotFound);
    }
    Ok(())
}

/// Stores the link-annotated HTML variant of a paragraph's text.
pub fn set_text_with_links(
    conn: &Connection,
    id: i64,
    html: &str,
) -> Result<(), ParagraphStoreError> {
    let changed = conn.execute(
        "UPDATE paragraphs SET text_with_links = ?2 WHERE id = ?1",
        params![id, html],
    )?;

    if changed == 0 {
        return Err(ParagraphStoreError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{seed_story, test_conn};

    #[test]
    fn test_insert_defaults_and_get() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        let p = insert(&conn, chapter_id, "opening line", 1, 1, true).unwrap();
        let found = get(&conn, p.id).unwrap().unwrap();
        assert!(found.is_locked);
        assert!(found.nft_owner_id.is_none());
        assert!(found.text_with_links.is_none());
    }

    #[test]
    fn test_position_unique_within_page() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        insert(&conn, chapter_id, "a", 1, 1, true).unwrap();
        assert!(insert(&conn, chapter_id, "b", 1, 1, true).is_err());
        // Same number on the next page is a different position
        insert(&conn, chapter_id, "b", 1, 2, true).unwrap();
    }

    #[test]
    fn test_list_page_filters_and_orders() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        insert(&conn, chapter_id, "p1-2", 2, 1, true).unwrap();
        insert(&conn, chapter_id, "p1-1", 1, 1, true).unwrap();
        insert(&conn, chapter_id, "p2-1", 1, 2, true).unwrap();

        let page1 = list_page(&conn, chapter_id, 1).unwrap();
        let numbers: Vec<u32> = page1.iter().map(|p| p.paragraph_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(page1.iter().all(|p| p.page == 1));
    }

    #[test]
    fn test_page_exists_probe() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        insert(&conn, chapter_id, "only page", 1, 1, true).unwrap();
        assert!(page_exists(&conn, chapter_id, 1).unwrap());
        assert!(!page_exists(&conn, chapter_id, 2).unwrap());
    }

    #[test]
    fn test_last_page_defaults_to_one() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        assert_eq!(last_page(&conn, chapter_id).unwrap(), 1);
        insert(&conn, chapter_id, "x", 1, 3, true).unwrap();
        assert_eq!(last_page(&conn, chapter_id).unwrap(), 3);
    }

    #[test]
    fn test_texts_through_page_window() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);

        insert(&conn, chapter_id, "one", 1, 1, true).unwrap();
        insert(&conn, chapter_id, "two", 2, 1, true).unwrap();
        insert(&conn, chapter_id, "three", 1, 2, true).unwrap();
        insert(&conn, chapter_id, "beyond", 1, 3, true).unwrap();

        let texts = texts_through_page(&conn, chapter_id, 2).unwrap();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_set_unlocked_missing_row() {
        let conn = test_conn();
        assert!(matches!(
            set_unlocked(&conn, 404),
            Err(ParagraphStoreError::NotFound)
        ));
    }
}

use crate::database::{chapters, paragraphs};
use crate::error::{Result, StoryError};
use crate::models::Paragraph;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::info;

/// One page of a chapter plus a cheap probe for whether more follows.
#[derive(Debug, Clone, Serialize)]
pub struct PageListing {
    pub paragraphs: Vec<Paragraph>,
    pub has_next: bool,
}

fn require_chapter(conn: &Connection, chapter_id: i64) -> Result<()> {
    chapters::get(conn, chapter_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Chapter {} not found", chapter_id)))?;
    Ok(())
}

fn require_page(page: u32) -> Result<u32> {
    if page == 0 {
        return Err(StoryError::Validation("Page numbers start at 1".to_string()));
    }
    Ok(page)
}

/// Resolves "page N of chapter C".
///
/// Paragraphs come back ordered by paragraph_number; has_next is an
/// existence probe against page N+1 and never materializes that page.
pub fn list_page(conn: &Connection, chapter_id: i64, page: Option<u32>) -> Result<PageListing> {
    require_chapter(conn, chapter_id)?;
    let page = require_page(page.unwrap_or(1))?;

    let listing = paragraphs::list_page(conn, chapter_id, page)?;
    let has_next = paragraphs::page_exists(conn, chapter_id, page + 1)?;

    Ok(PageListing {
        paragraphs: listing,
        has_next,
    })
}

/// Highest page of a chapter, 1 when it has no paragraphs yet.
pub fn last_page(conn: &Connection, chapter_id: i64) -> Result<u32> {
    require_chapter(conn, chapter_id)?;
    Ok(paragraphs::last_page(conn, chapter_id)?)
}

/// Appends a paragraph at the end of a page.
///
/// The count-then-insert runs under an immediate transaction; concurrent
/// appends to the same (chapter, page) serialize there, so numbering
/// stays dense with no duplicates.
pub fn append_paragraph(
    conn: &Connection,
    chapter_id: i64,
    page: u32,
    text: &str,
    locked: bool,
) -> Result<Paragraph> {
    require_chapter(conn, chapter_id)?;
    let page = require_page(page)?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let next_number = paragraphs::count_on_page(&tx, chapter_id, page)? + 1;
    let paragraph = paragraphs::insert(&tx, chapter_id, text, next_number, page, locked)?;
    tx.commit()?;

    info!(
        "Appended paragraph {} at chapter {} page {} position {}",
        paragraph.id, chapter_id, page, next_number
    );
    Ok(paragraph)
}

/// Starts a fresh page after current_page with an unlocked first paragraph.
pub fn append_new_page(
    conn: &Connection,
    chapter_id: i64,
    current_page: u32,
    text: &str,
) -> Result<Paragraph> {
    require_chapter(conn, chapter_id)?;
    let current_page = require_page(current_page)?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let next_number = paragraphs::count_on_page(&tx, chapter_id, current_page + 1)? + 1;
    let paragraph =
        paragraphs::insert(&tx, chapter_id, text, next_number, current_page + 1, false)?;
    tx.commit()?;

    info!(
        "Opened page {} of chapter {} with paragraph {}",
        current_page + 1,
        chapter_id,
        paragraph.id
    );
    Ok(paragraph)
}

/// Text of the last paragraph on a page, if the page has any. Context for
/// continuing the page.
pub fn page_context(conn: &Connection, chapter_id: i64, page: u32) -> Result<Option<String>> {
    Ok(paragraphs::last_on_page(conn, chapter_id, page)?.map(|p| p.text))
}

/// Concatenated chapter text up to and including `page`, in natural
/// (page, paragraph_number) order. Context for opening the next page.
pub fn chapter_context_through(conn: &Connection, chapter_id: i64, page: u32) -> Result<String> {
    Ok(paragraphs::texts_through_page(conn, chapter_id, page)?.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{seed_story, test_conn};
    use crate::database::paragraphs;

    #[test]
    fn test_two_page_scenario() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        paragraphs::insert(&conn, chapter_id, "p1#1", 1, 1, true).unwrap();
        paragraphs::insert(&conn, chapter_id, "p1#2", 2, 1, true).unwrap();
        paragraphs::insert(&conn, chapter_id, "p2#1", 1, 2, true).unwrap();

        let page1 = list_page(&conn, chapter_id, Some(1)).unwrap();
        let numbers: Vec<u32> = page1.paragraphs.iter().map(|p| p.paragraph_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(page1.has_next);

        let page2 = list_page(&conn, chapter_id, Some(2)).unwrap();
        assert_eq!(page2.paragraphs.len(), 1);
        assert!(!page2.has_next);
    }

    #[test]
    fn test_page_defaults_to_one() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        paragraphs::insert(&conn, chapter_id, "only", 1, 1, true).unwrap();

        let listing = list_page(&conn, chapter_id, None).unwrap();
        assert_eq!(listing.paragraphs.len(), 1);
        assert!(!listing.has_next);
    }

    #[test]
    fn test_page_zero_rejected() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        assert!(matches!(
            list_page(&conn, chapter_id, Some(0)),
            Err(StoryError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_chapter_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            list_page(&conn, 404, None),
            Err(StoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_append_continues_numbering() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        for n in 1..=3 {
            paragraphs::insert(&conn, chapter_id, "x", n, 1, true).unwrap();
        }

        let appended = append_paragraph(&conn, chapter_id, 1, "generated", false).unwrap();
        assert_eq!(appended.paragraph_number, 4);
        assert_eq!(appended.page, 1);
        assert!(!appended.is_locked);
    }

    #[test]
    fn test_concurrent_appends_number_serially() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("storyline.db");
        crate::database::init_db(&db_path).unwrap();

        let conn = crate::database::open_connection(&db_path).unwrap();
        let (_, chapter_id, _) = seed_story(&conn);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db_path = db_path.clone();
                std::thread::spawn(move || {
                    let conn = crate::database::open_connection(&db_path).unwrap();
                    append_paragraph(&conn, chapter_id, 1, "line", false)
                        .unwrap()
                        .paragraph_number
                })
            })
            .collect();

        let mut numbers: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());

        let page = list_page(&conn, chapter_id, Some(1)).unwrap();
        assert_eq!(page.paragraphs.len(), 8);
    }

    #[test]
    fn test_append_new_page_starts_at_one() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        paragraphs::insert(&conn, chapter_id, "x", 1, 1, true).unwrap();

        let opened = append_new_page(&conn, chapter_id, 1, "fresh page").unwrap();
        assert_eq!(opened.page, 2);
        assert_eq!(opened.paragraph_number, 1);
        assert!(!opened.is_locked);

        let listing = list_page(&conn, chapter_id, Some(1)).unwrap();
        assert!(listing.has_next);
    }

    #[test]
    fn test_context_windows() {
        let conn = test_conn();
        let (_, chapter_id, _) = seed_story(&conn);
        paragraphs::insert(&conn, chapter_id, "one", 1, 1, true).unwrap();
        paragraphs::insert(&conn, chapter_id, "two", 2, 1, true).unwrap();
        paragraphs::insert(&conn, chapter_id, "three", 1, 2, true).unwrap();

        assert_eq!(
            page_context(&conn, chapter_id, 1).unwrap().as_deref(),
            Some("two")
        );
        assert!(page_context(&conn, chapter_id, 9).unwrap().is_none());
        assert_eq!(
            chapter_context_through(&conn, chapter_id, 2).unwrap(),
            "one\ntwo\nthree"
        );
    }
}

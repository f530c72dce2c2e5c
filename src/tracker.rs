use crate::database::{chapters, paragraphs, progress, visits};
use crate::error::{Result, StoryError};
use crate::models::VisitLogEntry;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::warn;

/// Records a single-paragraph view: one visit log append plus one
/// viewed-set update.
///
/// The visit append runs under an immediate transaction so concurrent
/// views by the same reader serialize on the max(view_order) read and can
/// never be assigned the same order. The viewed-set update is attempted
/// regardless of how the visit append fared; the first failure (if any)
/// is what the caller sees.
pub fn record_view(conn: &Connection, reader_id: i64, paragraph_id: i64) -> Result<VisitLogEntry> {
    let paragraph = paragraphs::get(conn, paragraph_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Paragraph {} not found", paragraph_id)))?;
    let chapter = chapters::get(conn, paragraph.chapter_id)?.ok_or_else(|| {
        StoryError::Internal(format!(
            "Paragraph {} references missing chapter {}",
            paragraph_id, paragraph.chapter_id
        ))
    })?;

    let visit = append_visit(conn, reader_id, chapter.story_id, chapter.id, paragraph_id);

    // Progress-set update is independent of the visit outcome
    let progress = mark_viewed(conn, reader_id, chapter.story_id, paragraph_id);

    if let Err(e) = &progress {
        warn!(
            "Viewed-set update failed for reader {} paragraph {}: {}",
            reader_id, paragraph_id, e
        );
    }

    let entry = visit?;
    progress?;
    Ok(entry)
}

fn append_visit(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
    chapter_id: i64,
    paragraph_id: i64,
) -> Result<VisitLogEntry> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let order = visits::next_order(&tx, reader_id)?;
    let entry = visits::append(&tx, reader_id, story_id, chapter_id, paragraph_id, order)?;
    tx.commit()?;
    Ok(entry)
}

/// Adds a paragraph to the (reader, story) viewed set, creating the
/// progress row when absent. Touches last_accessed even when the
/// paragraph was already in the set.
///
/// Deliberately does not verify that the paragraph belongs to the story;
/// explicit client-side progress pings pass whatever location they hold.
pub fn mark_viewed(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
    paragraph_id: i64,
) -> Result<()> {
    let record = progress::upsert(conn, reader_id, story_id)?;
    progress::add_viewed(conn, record.id, paragraph_id)?;
    Ok(())
}

/// Get-or-create of the progress row alone, with an optional viewed-set
/// add when the client supplied a paragraph.
pub fn record_progress(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
    paragraph_id: Option<i64>,
) -> Result<()> {
    let record = progress::upsert(conn, reader_id, story_id)?;
    if let Some(paragraph_id) = paragraph_id {
        progress::add_viewed(conn, record.id, paragraph_id)?;
    }
    Ok(())
}

/// Distinct paragraph ids the reader has seen in a story.
pub fn viewed_paragraphs(conn: &Connection, reader_id: i64, story_id: i64) -> Result<Vec<i64>> {
    let record = progress::get(conn, reader_id, story_id)?.ok_or_else(|| {
        StoryError::NotFound(format!(
            "No reading progress for reader {} in story {}",
            reader_id, story_id
        ))
    })?;

    Ok(progress::list_viewed(conn, record.id)?)
}

/// The replayable reading trail: every visit in order, oldest first.
pub fn navigation_history(
    conn: &Connection,
    reader_id: i64,
    story_id: i64,
) -> Result<Vec<VisitLogEntry>> {
    Ok(visits::list_history(conn, reader_id, story_id)?)
}

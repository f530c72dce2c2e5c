use super::Context;
use crate::error::{Result, StoryError};
use crate::tracker;
use serde_json::{json, Value};

pub fn record_progress(
    ctx: &Context,
    reader_id: i64,
    story_id: i64,
    _current_chapter: Option<i64>,
    current_paragraph: Option<i64>,
) -> Result<Value> {
    let conn = ctx.connection()?;
    tracker::record_progress(&conn, reader_id, story_id, current_paragraph)?;

    Ok(json!({"status": "success"}))
}

// The chapter id is accepted but unused, matching the plain progress ping;
// only story and paragraph participate in the update.
pub fn mark_viewed(
    ctx: &Context,
    reader_id: i64,
    story_id: i64,
    _chapter: Option<i64>,
    paragraph_id: i64,
) -> Result<Value> {
    let conn = ctx.connection()?;
    tracker::mark_viewed(&conn, reader_id, story_id, paragraph_id)?;

    Ok(json!({"status": "success"}))
}

pub fn viewed_paragraphs(ctx: &Context, reader_id: i64, story_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let viewed = tracker::viewed_paragraphs(&conn, reader_id, story_id)?;

    Ok(json!({"viewed_paragraphs": viewed}))
}

pub fn navigation_history(ctx: &Context, reader_id: i64, story_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    let history = tracker::navigation_history(&conn, reader_id, story_id)?;

    Ok(serde_json::to_value(history)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize history: {}", e)))?)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_context;
    use crate::database::{chapters, paragraphs, readers, stories};

    #[test]
    fn test_progress_without_paragraph_only_creates_record() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        let reader = readers::insert(&conn, "r@example.com").unwrap();

        super::record_progress(&ctx, reader.id, story.id, None, None).unwrap();
        let viewed = super::viewed_paragraphs(&ctx, reader.id, story.id).unwrap();
        assert_eq!(viewed["viewed_paragraphs"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_mark_viewed_adds_to_set() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        let chapter = chapters::insert(&conn, story.id, "C", 1).unwrap();
        let p = paragraphs::insert(&conn, chapter.id, "x", 1, 1, false).unwrap();
        let reader = readers::insert(&conn, "r@example.com").unwrap();

        super::mark_viewed(&ctx, reader.id, story.id, Some(chapter.id), p.id).unwrap();
        super::mark_viewed(&ctx, reader.id, story.id, None, p.id).unwrap();

        let viewed = super::viewed_paragraphs(&ctx, reader.id, story.id).unwrap();
        assert_eq!(viewed["viewed_paragraphs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_viewed_before_any_progress_is_not_found() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        let reader = readers::insert(&conn, "r@example.com").unwrap();

        assert!(super::viewed_paragraphs(&ctx, reader.id, story.id).is_err());
    }
}

use super::Context;
use crate::database::{chapters, stories};
use crate::error::{Result, StoryError};
use serde_json::Value;

pub fn list_stories(ctx: &Context) -> Result<Value> {
    let conn = ctx.connection()?;
    let all = stories::list(&conn)?;
    Ok(serde_json::to_value(all)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize stories: {}", e)))?)
}

pub fn list_chapters(ctx: &Context, story_id: i64) -> Result<Value> {
    let conn = ctx.connection()?;
    stories::get(&conn, story_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Story {} not found", story_id)))?;

    let listing = chapters::list_by_story(&conn, story_id)?;
    Ok(serde_json::to_value(listing)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize chapters: {}", e)))?)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_context;
    use crate::database::{chapters, stories};

    #[test]
    fn test_list_chapters_requires_story() {
        let (_dir, ctx) = test_context("");
        assert!(super::list_chapters(&ctx, 404).is_err());
    }

    #[test]
    fn test_chapters_come_back_ordered() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = stories::insert(&conn, "S", "", "a").unwrap();
        chapters::insert(&conn, story.id, "Two", 2).unwrap();
        chapters::insert(&conn, story.id, "One", 1).unwrap();

        let value = super::list_chapters(&ctx, story.id).unwrap();
        let numbers: Vec<i64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["chapter_number"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}

use crate::config::Config;
use crate::database::paragraphs;
use crate::error::{Result, StoryError};
use crate::llm::{AiClient, ChatMessage};
use crate::models::Paragraph;
use crate::pagination;
use rusqlite::Connection;
use tracing::{error, info, warn};

const CONTINUE_PROMPT: &str = "You are a creative writer continuing a story. \
    Write the next paragraph naturally continuing from the previous text.";

const NEXT_PAGE_PROMPT: &str = "You are a creative writer continuing a story. \
    Based on the previous content of this chapter, write the first paragraph \
    of the next page. Ensure it flows naturally from the previous content \
    while advancing the story.";

const LINK_PROMPT: &str = "You are an AI that identifies important words or \
    phrases that could be wiki-style links. Select 2-4 significant nouns or \
    phrases that could lead to interesting related content. Return the \
    paragraph with the links added in HTML format. Only return the paragraph \
    text, not the prompt, quotes, or anything else.";

/// Generates the next paragraph of a chapter page and appends it,
/// unlocked. Without an explicit page the chapter's last page is
/// continued. A generation failure leaves no paragraph behind.
pub async fn generate_next_paragraph(
    conn: &Connection,
    ai: &dyn AiClient,
    config: &Config,
    chapter_id: i64,
    page: Option<u32>,
) -> Result<Paragraph> {
    let page = match page {
        Some(p) => p,
        None => pagination::last_page(conn, chapter_id)?,
    };

    let context = pagination::page_context(conn, chapter_id, page)?.unwrap_or_default();
    let messages = vec![
        ChatMessage::system(CONTINUE_PROMPT),
        ChatMessage::user(format!(
            "Previous paragraph: {}\n\nWrite the next paragraph:",
            context
        )),
    ];

    let text = ai
        .chat(messages, config.story_temperature, config.max_tokens)
        .await
        .map_err(|e| {
            error!("Paragraph generation failed for chapter {}: {}", chapter_id, e);
            e
        })?;

    let mut paragraph = pagination::append_paragraph(conn, chapter_id, page, &text, false)?;
    info!(
        "Generated paragraph {} on chapter {} page {}",
        paragraph.id, chapter_id, page
    );
    annotate_fresh(conn, ai, config, &mut paragraph).await;
    Ok(paragraph)
}

/// Link pass over a just-created paragraph. Best effort: the paragraph
/// stands without links when the second model call fails.
async fn annotate_fresh(
    conn: &Connection,
    ai: &dyn AiClient,
    config: &Config,
    paragraph: &mut Paragraph,
) {
    match annotate_links(conn, ai, config, paragraph.id).await {
        Ok(html) => paragraph.text_with_links = Some(html),
        Err(e) => warn!(
            "Skipping link annotation for fresh paragraph {}: {}",
            paragraph.id, e
        ),
    }
}

/// Generates the first paragraph of a fresh page from the chapter's
/// accumulated context through current_page.
pub async fn generate_next_page(
    conn: &Connection,
    ai: &dyn AiClient,
    config: &Config,
    chapter_id: i64,
    current_page: u32,
) -> Result<Paragraph> {
    let context = pagination::chapter_context_through(conn, chapter_id, current_page)?;
    let messages = vec![
        ChatMessage::system(NEXT_PAGE_PROMPT),
        ChatMessage::user(format!(
            "Previous content of the chapter:\n\n{}\n\nWrite the first paragraph of the next page:",
            context
        )),
    ];

    let text = ai
        .chat(messages, config.story_temperature, config.max_tokens)
        .await
        .map_err(|e| {
            error!("Next-page generation failed for chapter {}: {}", chapter_id, e);
            e
        })?;

    let mut paragraph = pagination::append_new_page(conn, chapter_id, current_page, &text)?;
    info!(
        "Generated page {} opener {} for chapter {}",
        paragraph.page, paragraph.id, chapter_id
    );
    annotate_fresh(conn, ai, config, &mut paragraph).await;
    Ok(paragraph)
}

/// Produces the link-annotated HTML variant of an existing paragraph and
/// stores it alongside the raw text.
pub async fn annotate_links(
    conn: &Connection,
    ai: &dyn AiClient,
    config: &Config,
    paragraph_id: i64,
) -> Result<String> {
    let paragraph = paragraphs::get(conn, paragraph_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Paragraph {} not found", paragraph_id)))?;

    let messages = vec![
        ChatMessage::system(LINK_PROMPT),
        ChatMessage::user(format!(
            "Identify potential link phrases in this text:\n\n{}",
            paragraph.text
        )),
    ];

    let html = ai
        .chat(messages, config.link_temperature, config.max_tokens)
        .await
        .map_err(|e| {
            error!("Link annotation failed for paragraph {}: {}", paragraph_id, e);
            e
        })?;

    paragraphs::set_text_with_links(conn, paragraph_id, &html)?;
    Ok(html)
}

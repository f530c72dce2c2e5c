mod auth;
mod chapters;
mod nfts;
mod paragraphs;
mod payments;
mod progress;
mod stories;

use crate::config::Config;
use crate::error::{Result, StoryError};
use crate::llm::AiClient;
use crate::wallet::WalletClient;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared handler state: database location, configuration, and the
/// external service clients. The wallet client is optional; operations
/// that need custody fail with a wallet error when it is absent.
pub struct Context {
    db_path: PathBuf,
    config: Config,
    ai: Arc<dyn AiClient>,
    wallet: Option<Arc<dyn WalletClient>>,
}

impl Context {
    pub fn new(
        db_path: PathBuf,
        config: Config,
        ai: Arc<dyn AiClient>,
        wallet: Option<Arc<dyn WalletClient>>,
    ) -> Self {
        Context {
            db_path,
            config,
            ai,
            wallet,
        }
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(crate::database::open_connection(&self.db_path)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ai(&self) -> &dyn AiClient {
        self.ai.as_ref()
    }

    pub fn wallet(&self) -> Result<&dyn WalletClient> {
        self.wallet
            .as_deref()
            .ok_or_else(|| StoryError::Wallet("Custody service is not configured".to_string()))
    }
}

/// Every operation the service exposes, one variant per handler. Requests
/// arrive as JSON objects tagged by "op"; unknown fields are rejected so
/// a misspelled argument fails loudly instead of silently defaulting.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum ApiRequest {
    ListStories,
    ListChapters {
        story: i64,
    },
    ListPage {
        chapter: i64,
        #[serde(default)]
        page: Option<u32>,
    },
    GenerateParagraph {
        chapter: i64,
        #[serde(default)]
        page: Option<u32>,
    },
    GenerateNextPage {
        chapter: i64,
        current_page: u32,
    },
    GetParagraph {
        reader: i64,
        paragraph: i64,
    },
    UnlockParagraph {
        reader: i64,
        paragraph: i64,
        #[serde(default)]
        amount: Option<Decimal>,
    },
    RecordProgress {
        reader: i64,
        story: i64,
        #[serde(default)]
        current_chapter: Option<i64>,
        #[serde(default)]
        current_paragraph: Option<i64>,
    },
    MarkViewed {
        reader: i64,
        story: i64,
        #[serde(default)]
        chapter: Option<i64>,
        paragraph: i64,
    },
    ViewedParagraphs {
        reader: i64,
        story: i64,
    },
    NavigationHistory {
        reader: i64,
        story: i64,
    },
    ListPayments {
        reader: i64,
    },
    ListNfts {
        reader: i64,
    },
    NftRevenue {
        reader: i64,
        nft: i64,
    },
    MintNft {
        reader: i64,
        paragraph: i64,
    },
    AnnotateParagraph {
        paragraph: i64,
    },
    Login {
        email: String,
    },
}

/// Routes a request to its handler. The routing is a plain match over the
/// tagged variants; every handler is an ordinary function with its own
/// input contract.
pub async fn dispatch(ctx: &Context, request: ApiRequest) -> Result<Value> {
    match request {
        ApiRequest::ListStories => stories::list_stories(ctx),
        ApiRequest::ListChapters { story } => stories::list_chapters(ctx, story),
        ApiRequest::ListPage { chapter, page } => chapters::list_page(ctx, chapter, page),
        ApiRequest::GenerateParagraph { chapter, page } => {
            chapters::generate_paragraph(ctx, chapter, page).await
        }
        ApiRequest::GenerateNextPage {
            chapter,
            current_page,
        } => chapters::generate_next_page(ctx, chapter, current_page).await,
        ApiRequest::GetParagraph { reader, paragraph } => {
            paragraphs::get_paragraph(ctx, reader, paragraph)
        }
        ApiRequest::UnlockParagraph {
            reader,
            paragraph,
            amount,
        } => paragraphs::unlock_paragraph(ctx, reader, paragraph, amount),
        ApiRequest::RecordProgress {
            reader,
            story,
            current_chapter,
            current_paragraph,
        } => progress::record_progress(ctx, reader, story, current_chapter, current_paragraph),
        ApiRequest::MarkViewed {
            reader,
            story,
            chapter,
            paragraph,
        } => progress::mark_viewed(ctx, reader, story, chapter, paragraph),
        ApiRequest::ViewedParagraphs { reader, story } => {
            progress::viewed_paragraphs(ctx, reader, story)
        }
        ApiRequest::NavigationHistory { reader, story } => {
            progress::navigation_history(ctx, reader, story)
        }
        ApiRequest::ListPayments { reader } => payments::list_payments(ctx, reader),
        ApiRequest::ListNfts { reader } => nfts::list_nfts(ctx, reader),
        ApiRequest::NftRevenue { reader, nft } => nfts::nft_revenue(ctx, reader, nft),
        ApiRequest::MintNft { reader, paragraph } => nfts::mint_nft(ctx, reader, paragraph).await,
        ApiRequest::AnnotateParagraph { paragraph } => {
            paragraphs::annotate_paragraph(ctx, paragraph).await
        }
        ApiRequest::Login { email } => auth::login(ctx, &email).await,
    }
}

/// Parses and serves one raw request value, mapping failures onto the
/// error envelope.
pub async fn handle_value(ctx: &Context, raw: Value) -> Value {
    let request: ApiRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return error_envelope(&StoryError::Validation(format!("Invalid request: {}", e)));
        }
    };

    match dispatch(ctx, request).await {
        Ok(payload) => payload,
        Err(e) => error_envelope(&e),
    }
}

fn error_envelope(err: &StoryError) -> Value {
    serde_json::json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::test_context;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_op_is_validation_error() {
        let (_dir, ctx) = test_context("");
        let response = handle_value(&ctx, json!({"op": "explode"})).await;
        assert_eq!(response["error"]["kind"], "validation");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let (_dir, ctx) = test_context("");
        // mark_viewed requires both story and paragraph
        let response =
            handle_value(&ctx, json!({"op": "mark_viewed", "reader": 1, "story": 1})).await;
        assert_eq!(response["error"]["kind"], "validation");
    }

    #[tokio::test]
    async fn test_full_reading_flow() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = crate::database::stories::insert(&conn, "S", "", "a").unwrap();
        let chapter = crate::database::chapters::insert(&conn, story.id, "C1", 1).unwrap();
        let p1 = crate::database::paragraphs::insert(&conn, chapter.id, "one", 1, 1, false).unwrap();
        let p2 = crate::database::paragraphs::insert(&conn, chapter.id, "two", 2, 1, false).unwrap();
        let reader = crate::database::readers::insert(&conn, "r@example.com").unwrap();

        let listing =
            handle_value(&ctx, json!({"op": "list_page", "chapter": chapter.id})).await;
        assert_eq!(listing["results"].as_array().unwrap().len(), 2);
        assert_eq!(listing["has_next"], false);

        for p in [p1.id, p2.id] {
            let response = handle_value(
                &ctx,
                json!({"op": "get_paragraph", "reader": reader.id, "paragraph": p}),
            )
            .await;
            assert_eq!(response["view_recorded"], true);
        }

        let history = handle_value(
            &ctx,
            json!({"op": "navigation_history", "reader": reader.id, "story": story.id}),
        )
        .await;
        let orders: Vec<i64> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["view_order"].as_i64().unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2]);

        let viewed = handle_value(
            &ctx,
            json!({"op": "viewed_paragraphs", "reader": reader.id, "story": story.id}),
        )
        .await;
        assert_eq!(viewed["viewed_paragraphs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unlock_flow_and_conflict_mapping() {
        let (_dir, ctx) = test_context("");
        let conn = ctx.connection().unwrap();
        let story = crate::database::stories::insert(&conn, "S", "", "a").unwrap();
        let chapter = crate::database::chapters::insert(&conn, story.id, "C1", 1).unwrap();
        let p = crate::database::paragraphs::insert(&conn, chapter.id, "x", 1, 1, true).unwrap();
        let reader = crate::database::readers::insert(&conn, "r@example.com").unwrap();

        let unlock = json!({
            "op": "unlock_paragraph",
            "reader": reader.id,
            "paragraph": p.id,
            "amount": "0.50",
        });
        let response = handle_value(&ctx, unlock.clone()).await;
        assert_eq!(response["detail"], "Paragraph unlocked successfully");

        let again = handle_value(&ctx, unlock).await;
        assert_eq!(again["error"]["kind"], "conflict");

        let payments =
            handle_value(&ctx, json!({"op": "list_payments", "reader": reader.id})).await;
        assert_eq!(payments.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_and_login() {
        let (_dir, ctx) = test_context("fresh prose");
        let conn = ctx.connection().unwrap();
        let story = crate::database::stories::insert(&conn, "S", "", "a").unwrap();
        let chapter = crate::database::chapters::insert(&conn, story.id, "C1", 1).unwrap();

        let generated = handle_value(
            &ctx,
            json!({"op": "generate_paragraph", "chapter": chapter.id}),
        )
        .await;
        assert_eq!(generated["text"], "fresh prose");
        assert_eq!(generated["is_locked"], false);

        let login = handle_value(&ctx, json!({"op": "login", "email": "n@example.com"})).await;
        assert_eq!(login["is_new_reader"], true);
        assert_eq!(login["wallet_address"], "0xstub");
    }
}

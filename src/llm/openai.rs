use crate::error::Result;
use crate::llm::provider::{AiClient, ChatMessage};
use crate::StoryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat client for any OpenAI-compatible endpoint. The API key is
/// optional so the same client covers local servers that ignore auth.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: Option<String>, chat_model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| StoryError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OpenAiClient {
            client,
            base_url,
            api_key,
            chat_model,
        })
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| StoryError::Generation(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoryError::Generation(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| StoryError::Generation(format!("Failed to parse response: {}", e)))?;

        if chat_response.choices.is_empty() {
            return Err(StoryError::Generation("No choices in response".to_string()));
        }

        Ok(chat_response.choices[0].message.content.clone())
    }
}

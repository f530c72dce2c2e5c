pub mod factory;
pub mod openai;
pub mod provider;

pub use factory::create_client;
pub use openai::OpenAiClient;
pub use provider::{AiClient, ChatMessage};

#[cfg(test)]
pub(crate) mod test_support {
    use super::provider::{AiClient, ChatMessage};
    use crate::error::Result;
    use crate::StoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Canned-response client; records the messages it was handed.
    pub struct StubAi {
        pub reply: String,
        pub fail: bool,
        pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubAi {
        pub fn replying(reply: &str) -> Self {
            StubAi {
                reply: reply.to_string(),
                fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            StubAi {
                reply: String::new(),
                fail: true,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiClient for StubAi {
        async fn chat(
            &self,
            messages: Vec<ChatMessage>,
            _temperature: f32,
            _max_tokens: usize,
        ) -> Result<String> {
            self.seen.lock().unwrap().push(messages);
            if self.fail {
                return Err(StoryError::Generation("model unavailable".to_string()));
            }
            Ok(self.reply.clone())
        }
    }
}

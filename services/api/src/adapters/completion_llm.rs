//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the quiz and review LLM calls.
//! It implements the `QuizCompletionService` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint (Gemini's by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use quiz_core::{
    ApiCredential, CompletionClientProvider, PortError, PortResult, QuizCompletionService,
};
use std::sync::Arc;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuizCompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    quiz_model: String,
    review_model: String,
    temperature: f32,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(
        client: Client<OpenAIConfig>,
        quiz_model: String,
        review_model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            quiz_model,
            review_model,
            temperature,
        }
    }

    /// Sends the prompt as a single user message and returns the first choice's text.
    async fn complete(&self, model: &str, prompt: &str) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(self.temperature)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!("Calling model {} with a {}-char prompt", model, prompt.chars().count());

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Remote(Box::new(e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::EmptyCompletion {
                model: model.to_string(),
            })
    }
}

//=========================================================================================
// `QuizCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuizCompletionService for OpenAiCompletionAdapter {
    async fn complete_quiz(&self, prompt: &str) -> PortResult<String> {
        self.complete(&self.quiz_model, prompt).await
    }

    async fn complete_review(&self, prompt: &str) -> PortResult<String> {
        self.complete(&self.review_model, prompt).await
    }
}

//=========================================================================================
// Per-request Client Provider
//=========================================================================================

/// Builds an `OpenAiCompletionAdapter` for each submitted credential.
#[derive(Clone, Debug)]
pub struct OpenAiClientProvider {
    api_base: String,
    quiz_model: String,
    review_model: String,
    temperature: f32,
}

impl OpenAiClientProvider {
    pub fn new(api_base: String, quiz_model: String, review_model: String, temperature: f32) -> Self {
        Self {
            api_base,
            quiz_model,
            review_model,
            temperature,
        }
    }
}

impl CompletionClientProvider for OpenAiClientProvider {
    fn connect(&self, credential: &ApiCredential) -> PortResult<Arc<dyn QuizCompletionService>> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&self.api_base)
            .with_api_key(credential.expose());
        let adapter: Arc<dyn QuizCompletionService> = Arc::new(OpenAiCompletionAdapter::new(
            Client::with_config(openai_config),
            self.quiz_model.clone(),
            self.review_model.clone(),
            self.temperature,
        ));
        Ok(adapter)
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::{Config, TOP_K},
    message::Message,
    openai::OpenAI,
    pinecone::{Match, Pinecone},
    prompt,
    stream::TextStream,
};

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_chat(&self, messages: Vec<Message>) -> Result<TextStream>;
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Conversation must contain at least one message.")]
    EmptyConversation,

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Answers questions about professors using the reviews closest to the latest message.
#[derive(Clone)]
pub struct Advisor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
}

impl Advisor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
        }
    }

    /// Builds an advisor backed by OpenAI and Pinecone.
    #[must_use]
    pub fn connect(config: &Config) -> Self {
        let openai = Arc::new(OpenAI::new(config));

        Self::new(openai.clone(), Arc::new(Pinecone::connect(config)), openai)
    }

    /// Starts answering the last message of `conversation`.
    ///
    /// Embedding, retrieval and the start of generation all happen before this returns,
    /// so any failure there is reported here rather than through the stream.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::EmptyConversation`] for an empty conversation, and
    /// [`AdvisorError::Upstream`] if any of the external services fail.
    pub async fn answer(&self, mut conversation: Vec<Message>) -> Result<TextStream, AdvisorError> {
        let question = conversation.pop().ok_or(AdvisorError::EmptyConversation)?;

        let vector = self
            .embedder
            .embed(&question.content)
            .await
            .context("Failed to embed question")?;
        debug!("Embedded question into {} dimensions", vector.len());

        let matches = self
            .index
            .query(&vector, TOP_K)
            .await
            .context("Failed to query reviews")?;
        debug!("Retrieved {} reviews", matches.len());

        let messages = prompt::compose(&conversation, prompt::augment(&question.content, &matches));

        Ok(self
            .chat
            .stream_chat(messages)
            .await
            .context("Failed to start completion")?)
    }
}

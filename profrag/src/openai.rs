use anyhow::Result;
use async_openai::{
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageArgs,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, Role as OpenAIRole,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::debug;

use crate::{
    advisor::{ChatModel, Embedder},
    config::{Config, CHAT_MODEL, EMBEDDING_MODEL},
    message::{Message, Role},
    stream::{start, TextStream},
};

pub struct OpenAI {
    client: Arc<Client>,
}

impl OpenAI {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut client = Client::new().with_api_key(&config.openai_api_key);

        if let Some(api_base) = &config.openai_api_base {
            client = client.with_api_base(api_base);
        }

        Self {
            client: Arc::new(client),
        }
    }

    /// Embeds a string into a vector of points.
    ///
    /// # Errors
    ///
    /// Returns an error if the Embeddings API returns an error or no embedding.
    pub async fn raw_embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(EMBEDDING_MODEL)
            .input(text)
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        Ok(response
            .data
            .first()
            .ok_or_else(|| anyhow::anyhow!("Could not find embedding"))?
            .embedding
            .clone())
    }

    /// Starts a streaming chat completion, yielding the content deltas as they arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the Chat Completions API refuses the request, which only shows up
    /// once the first event arrives. Errors after that are reported through the returned stream.
    pub async fn prompt_stream(&self, messages: Vec<Message>) -> Result<TextStream> {
        let messages = messages
            .into_iter()
            .map(into_request_message)
            .collect::<Result<Vec<_>>>()?;

        debug!("Requesting {CHAT_MODEL} completion for {} messages", messages.len());

        let request = CreateChatCompletionRequestArgs::default()
            .model(CHAT_MODEL)
            .messages(messages)
            .stream(true)
            .build()?;

        let chunks = self.client.chat().create_stream(request).await?;

        start(chunks.map(|chunk| {
            chunk.map(|chunk| {
                chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
            })
        }))
        .await
    }
}

fn into_request_message(message: Message) -> Result<ChatCompletionRequestMessage> {
    let role = match message.role {
        Role::System => OpenAIRole::System,
        Role::User => OpenAIRole::User,
        Role::Assistant => OpenAIRole::Assistant,
    };

    Ok(ChatCompletionRequestMessageArgs::default()
        .role(role)
        .content(message.content)
        .build()?)
}

#[async_trait]
impl Embedder for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.raw_embed(text).await
    }
}

#[async_trait]
impl ChatModel for OpenAI {
    async fn stream_chat(&self, messages: Vec<Message>) -> Result<TextStream> {
        self.prompt_stream(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve;
    use axum::{
        http::{header, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn config(api_base: String) -> Config {
        Config {
            openai_api_key: "sk-test".to_string(),
            openai_api_base: Some(api_base),
            pinecone_api_key: "pc-test".to_string(),
            pinecone_index: "rag".to_string(),
            pinecone_namespace: "ns1".to_string(),
            pinecone_host: None,
        }
    }

    fn chunk(delta: &Value) -> String {
        let chunk = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "created": 1_694_268_190,
            "model": "gpt-4",
            "choices": [{ "index": 0, "delta": delta, "finish_reason": null }]
        });

        format!("data: {chunk}\n\n")
    }

    fn unauthorized() -> impl IntoResponse {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "message": "Incorrect API key provided: sk-test.",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })),
        )
    }

    #[test]
    fn maps_roles() {
        let message = into_request_message(Message::assistant("Try Dr. A.")).unwrap();

        assert!(matches!(message.role, OpenAIRole::Assistant));
        assert_eq!(message.content, "Try Dr. A.");
    }

    #[tokio::test]
    async fn embeds_the_question() {
        let requests = Arc::new(Mutex::new(vec![]));
        let recorded = requests.clone();
        let api_base = serve(Router::new().route(
            "/embeddings",
            post(move |Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body);

                Json(json!({
                    "object": "list",
                    "model": "text-embedding-ada-002",
                    "data": [{ "object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0] }],
                    "usage": { "prompt_tokens": 4, "total_tokens": 4 }
                }))
            }),
        ));

        let vector = OpenAI::new(&config(api_base))
            .raw_embed("best CS professor?")
            .await
            .unwrap();

        assert_eq!(vector, [0.25, -0.5, 1.0]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0]["model"], "text-embedding-ada-002");
        assert_eq!(requests[0]["input"], "best CS professor?");
    }

    #[tokio::test]
    async fn fails_when_embedding_is_refused() {
        let api_base = serve(Router::new().route("/embeddings", post(|| async { unauthorized() })));

        let result = OpenAI::new(&config(api_base)).raw_embed("best CS professor?").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn streams_content_deltas_in_order() {
        let requests = Arc::new(Mutex::new(vec![]));
        let recorded = requests.clone();
        let api_base = serve(Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body);

                let events = [
                    chunk(&json!({ "role": "assistant" })),
                    chunk(&json!({ "content": "Dr. A " })),
                    chunk(&json!({ "content": "is great " })),
                    chunk(&json!({})),
                    chunk(&json!({ "content": "for CS." })),
                    "data: [DONE]\n\n".to_string(),
                ];

                ([(header::CONTENT_TYPE, "text/event-stream")], events.concat())
            }),
        ));

        let stream = OpenAI::new(&config(api_base))
            .prompt_stream(vec![
                Message::system("You recommend professors."),
                Message::user("best CS professor?"),
            ])
            .await;
        let Ok(stream) = stream else {
            panic!("expected the completion to start");
        };
        let fragments: Vec<String> = stream.map(Result::unwrap).collect().await;

        assert_eq!(fragments, ["Dr. A ", "is great ", "for CS."]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0]["model"], "gpt-4");
        assert_eq!(requests[0]["stream"], true);
        assert_eq!(requests[0]["messages"][1]["role"], "user");
        assert_eq!(requests[0]["messages"][1]["content"], "best CS professor?");
    }

    #[tokio::test]
    async fn fails_before_streaming_when_the_completion_is_refused() {
        let api_base = serve(Router::new().route(
            "/chat/completions",
            post(|| async { unauthorized() }),
        ));

        let result = OpenAI::new(&config(api_base))
            .prompt_stream(vec![Message::user("best CS professor?")])
            .await;

        let Err(err) = result else {
            panic!("expected the refused completion to fail before streaming");
        };
        assert!(err.to_string().contains("401"));
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{advisor::VectorIndex, config::Config};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_KEY_HEADER: &str = "Api-Key";

pub struct Pinecone {
    client: Client,
    api_key: String,
    base_url: String,
}

impl Pinecone {
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: CONTROL_PLANE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Looks up the data plane host serving an index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index doesn't exist or the Pinecone API fails.
    pub async fn describe_index(&self, name: &str) -> Result<String> {
        let index: IndexDescription = self
            .client
            .get(&format!("{}/indexes/{name}", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Resolved index {name} to {}", index.host);

        Ok(index.host)
    }

    /// The configured namespace. Without `PINECONE_HOST`, the index host is looked up on the
    /// first query.
    #[must_use]
    pub fn connect(config: &Config) -> Namespace {
        let namespace = Self::new(&config.pinecone_api_key)
            .namespace(&config.pinecone_index, &config.pinecone_namespace);

        match &config.pinecone_host {
            Some(host) => namespace.with_host(host),
            None => namespace,
        }
    }

    #[must_use]
    pub fn namespace(self, index: &str, name: &str) -> Namespace {
        Namespace {
            pinecone: self,
            index: index.to_string(),
            name: name.to_string(),
            base_url: OnceCell::new(),
        }
    }
}

fn data_plane_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

#[derive(Debug, serde::Deserialize)]
struct IndexDescription {
    host: String,
}

/// Metadata stored alongside every professor review.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReviewMetadata {
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub star: Value,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Match {
    /// The professor's name.
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: ReviewMetadata,
}

#[derive(Debug, serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

pub struct Namespace {
    pinecone: Pinecone,
    index: String,
    name: String,
    base_url: OnceCell<String>,
}

impl Namespace {
    #[must_use]
    pub fn with_host(mut self, host: &str) -> Self {
        self.base_url = OnceCell::new_with(Some(data_plane_url(host)));
        self
    }

    async fn base_url(&self) -> Result<&str> {
        let base_url = self
            .base_url
            .get_or_try_init(|| async {
                let host = self
                    .pinecone
                    .describe_index(&self.index)
                    .await
                    .with_context(|| format!("Failed to describe index {}", self.index))?;

                Ok::<_, anyhow::Error>(data_plane_url(&host))
            })
            .await?;

        Ok(base_url)
    }

    fn query_body(&self, vector: &[f32], top_k: usize) -> Value {
        serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "namespace": self.name,
        })
    }

    /// Finds the `top_k` reviews closest to `vector`, in the order Pinecone ranks them.
    ///
    /// # Errors
    ///
    /// Returns an error if the Pinecone API returns an error.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        let base_url = self.base_url().await?;

        let response: QueryResponse = self
            .pinecone
            .client
            .post(&format!("{base_url}/query"))
            .header(API_KEY_HEADER, &self.pinecone.api_key)
            .json(&self.query_body(vector, top_k))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Found {} matches in {}", response.matches.len(), self.name);

        Ok(response.matches)
    }
}

#[async_trait]
impl VectorIndex for Namespace {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        Self::query(self, vector, top_k).await
    }
}

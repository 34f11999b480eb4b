use anyhow::{Context, Result};
use std::env;

pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const CHAT_MODEL: &str = "gpt-4";

/// How many reviews are retrieved for every question.
pub const TOP_K: usize = 3;

const DEFAULT_INDEX: &str = "rag";
const DEFAULT_NAMESPACE: &str = "ns1";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_base: Option<String>,
    pub pinecone_api_key: String,
    pub pinecone_index: String,
    pub pinecone_namespace: String,
    pub pinecone_host: Option<String>,
}

impl Config {
    /// Reads the service credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` or `PINECONE_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("${key} not set"));

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_api_base: lookup("OPENAI_API_BASE"),
            pinecone_api_key: required("PINECONE_API_KEY")?,
            pinecone_index: lookup("PINECONE_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            pinecone_namespace: lookup("PINECONE_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            pinecone_host: lookup("PINECONE_HOST"),
        })
    }
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod advisor;
pub mod config;
mod message;
pub mod openai;
mod pinecone;
pub mod prompt;
pub mod stream;

#[cfg(test)]
mod test_server;

pub use advisor::{Advisor, AdvisorError, ChatModel, Embedder, VectorIndex};
pub use config::Config;
pub use message::{Message, Role};
pub use openai::OpenAI;
pub use pinecone::{Match, Namespace, Pinecone, ReviewMetadata};
pub use stream::TextStream;

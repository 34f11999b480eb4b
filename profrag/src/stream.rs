use anyhow::Result;
use async_fn_stream::try_fn_stream;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Incremental model output, in the order it was generated.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Waits for the first chunk, so that a refused request fails here instead of through the
/// returned stream, then relays the rest.
///
/// # Errors
///
/// Returns the first chunk's error, if any.
pub async fn start<S, E>(chunks: S) -> Result<TextStream>
where
    S: Stream<Item = Result<Option<String>, E>> + Send + Unpin + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    let mut chunks = chunks.peekable();

    if matches!(Pin::new(&mut chunks).peek().await, Some(Err(_))) {
        if let Some(Err(err)) = chunks.next().await {
            return Err(err.into());
        }
    }

    Ok(relay(chunks))
}

/// Forwards the non-empty fragments of a chunk stream one at a time.
///
/// Chunks without content are skipped. The first error ends the stream.
fn relay<S, E>(chunks: S) -> TextStream
where
    S: Stream<Item = Result<Option<String>, E>> + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    Box::pin(try_fn_stream(|emitter| async move {
        let mut chunks = Box::pin(chunks);

        while let Some(chunk) = chunks.next().await {
            match chunk.map_err(Into::<anyhow::Error>::into)? {
                Some(content) if !content.is_empty() => emitter.emit(content).await,
                _ => continue,
            }
        }

        Ok::<(), anyhow::Error>(())
    }))
}

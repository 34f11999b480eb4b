use axum::{
    body::{Bytes, StreamBody},
    extract::State,
    response::IntoResponse,
    Json,
};
use futures::StreamExt;
use profrag::Message;
use tracing::error;

use crate::axum::{errors::ApiResult, state::AppState};

/// Streams the advisor's answer to the last message of the conversation as plain text.
pub async fn answer(
    State(state): State<AppState>,
    Json(conversation): Json<Vec<Message>>,
) -> ApiResult<impl IntoResponse> {
    let fragments = state.advisor.answer(conversation).await?;

    Ok(StreamBody::new(fragments.map(|fragment| {
        fragment.map(Bytes::from).map_err(|err| {
            error!("Completion stream failed: {err:?}");
            err
        })
    })))
}

use axum::{routing::get, Router};

mod chat;

use crate::axum::state::AppState;

pub fn mount() -> Router<AppState> {
    Router::new()
        .merge(chat::mount())
        .route("/", get(|| async {}))
}

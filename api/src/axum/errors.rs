use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use profrag::AdvisorError;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Conversation must contain at least one message.")]
    EmptyConversation,

    #[error("Internal Server Error")]
    ServerError(#[from] anyhow::Error),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyConversation => StatusCode::BAD_REQUEST,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::EmptyConversation => Self::EmptyConversation,
            AdvisorError::Upstream(err) => Self::ServerError(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::ServerError(err) = &self {
            error!("Error handling request: {err:?}");
        }

        (self.status_code(), self.to_string()).into_response()
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string() && self.status_code() == other.status_code()
    }
}

use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use json::Json;
use quill_common::model::{
    ModelValidationError,
    auth::{SessionTokenDecodeError, SessionTokenHashError},
};
use quill_db::client::{DbClient, DbError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use time::{OffsetDateTime, UtcDateTime, format_description::well_known::Rfc3339};
use tracing::error;

pub mod auth;
mod flash;
mod json;
mod pages;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Timestamps cross the API boundary in RFC 3339 form.
pub(crate) fn format_timestamp(timestamp: UtcDateTime) -> Result<String, time::error::Format> {
    OffsetDateTime::from(timestamp).format(&Rfc3339)
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("No session token was provided")]
    MissingSessionToken,
    #[error("The provided session token could not be decoded: {0}")]
    InvalidSessionToken(#[from] SessionTokenDecodeError),
    #[error("The session token could not be hashed: {0}")]
    SessionTokenHash(#[from] SessionTokenHashError),
    #[error("Provided session token was invalid")]
    InvalidSession,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing title or content")]
    MissingPostContent,
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    Database(DbError),
    #[error("Formatting a timestamp failed: {0}")]
    TimestampFormat(#[from] time::error::Format),
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) | ServerError::PathRejection(_) => StatusCode::NOT_FOUND,
            ServerError::MissingSessionToken
            | ServerError::InvalidSession
            | ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::JsonRejection(_)
            | ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidSessionToken(_)
            | ServerError::MissingPostContent
            | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::SessionTokenHash(_)
            | ServerError::Database(_)
            | ServerError::TimestampFormat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::InvalidCredentials => ServerError::InvalidCredentials,
            other => ServerError::Database(other),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

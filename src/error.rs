// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing authorization token")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No mission to reroll")]
    NoMission,

    #[error("Cannot reroll a completed mission")]
    AlreadyCompleted,

    #[error("No rerolls remaining")]
    MaxRerollsReached,

    /// Absent and not-owned missions both map here.
    #[error("Mission not found")]
    MissionNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for client branching, if any.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::NoMission => Some("NO_MISSION"),
            AppError::AlreadyCompleted => Some("ALREADY_COMPLETED"),
            AppError::MaxRerollsReached => Some("MAX_REROLLS_REACHED"),
            AppError::MissionNotFound => Some("MISSION_NOT_FOUND"),
            AppError::UserNotFound => Some("USER_NOT_FOUND"),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::NoMission
            | AppError::AlreadyCompleted
            | AppError::MaxRerollsReached => StatusCode::BAD_REQUEST,
            AppError::MissionNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Internal server error".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Internal server error");
                "Internal server error".to_string()
            }
            AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn domain_errors_carry_codes() {
        let (status, json) = body_json(AppError::MaxRerollsReached).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MAX_REROLLS_REACHED");
        assert_eq!(json["error"], "No rerolls remaining");

        let (status, json) = body_json(AppError::MissionNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "MISSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn auth_and_input_errors_have_no_code() {
        let (status, json) = body_json(AppError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json.get("code").is_none());

        let (status, json) = body_json(AppError::BadRequest("goal is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "goal is required");
        assert!(json.get("code").is_none());
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, json) =
            body_json(AppError::Database("connection reset by peer at 10.0.0.3".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");

        let (_, json) = body_json(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(json["error"], "Internal server error");
    }
}

// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the confession board.
//!
//! Every admission or read failure is a tagged [`AppError`] variant; the
//! HTTP layer maps each tag to a status code instead of collapsing
//! everything into a generic 500. Internal detail is logged, never sent to
//! the client.

use crate::store::StoreError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Confession text is required")]
    MissingText,

    #[error("Comment text is required")]
    MissingComment,

    #[error("Text exceeds {max} characters")]
    TooLong { max: usize },

    #[error("Captcha token is required")]
    MissingCaptcha,

    #[error("Captcha verification failed")]
    CaptchaRejected { codes: Vec<String> },

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("Confession not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Stable machine-readable code for client-side handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingText => "missing_text",
            Self::MissingComment => "missing_comment",
            Self::TooLong { .. } => "text_too_long",
            Self::MissingCaptcha => "missing_captcha",
            Self::CaptchaRejected { .. } => "captcha_rejected",
            Self::RateLimited { .. } => "rate_limited",
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_unavailable",
            Self::Store(_) => "store_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::MissingText
            | Self::MissingComment
            | Self::TooLong { .. }
            | Self::MissingCaptcha
            | Self::CaptchaRejected { .. } => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "Request rejected");
        }

        let message = if status.is_server_error() {
            // Never leak store/provider internals to the client
            "Server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            message,
            code: self.code(),
            error_codes: match &self {
                Self::CaptchaRejected { codes } => Some(codes.clone()),
                _ => None,
            },
            retry_after_secs: match &self {
                Self::RateLimited { retry_after } => Some(retry_after_secs(*retry_after)),
                _ => None,
            },
        };

        match self {
            Self::RateLimited { retry_after } => (
                status,
                [(
                    header::RETRY_AFTER,
                    retry_after_secs(retry_after).to_string(),
                )],
                Json(body),
            )
                .into_response(),
            _ => (status, Json(body)).into_response(),
        }
    }
}

/// Whole seconds until retry, rounded up: a sub-second remainder still
/// means "not yet", never "retry now".
fn retry_after_secs(retry_after: Duration) -> u64 {
    retry_after.as_millis().div_ceil(1000) as u64
}

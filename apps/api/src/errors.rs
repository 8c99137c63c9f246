use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::insights::pipeline::PipelineError;
use crate::llm_client::GatewayError;

const TRY_AGAIN_MESSAGE: &str = "service temporarily unavailable, try again";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(msg) => AppError::Validation(msg),
            PipelineError::Gateway(e) => match e {
                GatewayError::RateLimited { retry_after } => AppError::RateLimited { retry_after },
                GatewayError::Unavailable { .. } => AppError::Unavailable(e.to_string()),
                GatewayError::Rejected { .. } | GatewayError::InvalidResponse(_) => {
                    AppError::Upstream(e.to_string())
                }
                GatewayError::Unauthenticated { .. } => AppError::Internal(e.into()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited { retry_after } => {
                tracing::warn!("Model backend rate limited (retry_after={retry_after:?})");
                (StatusCode::TOO_MANY_REQUESTS, TRY_AGAIN_MESSAGE.to_string())
            }
            AppError::Unavailable(msg) => {
                tracing::error!("Model backend unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, TRY_AGAIN_MESSAGE.to_string())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Model backend error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "The AI service returned an unusable response".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();

        if let AppError::RateLimited {
            retry_after: Some(delay),
        } = &self
        {
            if let Ok(value) = HeaderValue::from_str(&delay.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PipelineError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_pipeline_errors_map_to_status_codes() {
        assert_eq!(
            status_of(PipelineError::Validation("industry is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GatewayError::RateLimited { retry_after: None }.into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(
                GatewayError::Unavailable {
                    attempts: 2,
                    message: "503".into()
                }
                .into()
            ),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                GatewayError::Rejected {
                    status: 400,
                    message: "bad".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GatewayError::InvalidResponse("no candidates".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GatewayError::Unauthenticated { status: Some(401) }.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = AppError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }

    #[test]
    fn test_rate_limited_without_hint_has_no_header() {
        let response = AppError::RateLimited { retry_after: None }.into_response();
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}

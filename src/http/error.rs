//! Mapping of request failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use http_body_util::LengthLimitError;
use serde_json::json;
use thiserror::Error;

use crate::error::StreamError;
use crate::observability::metrics;
use crate::pipeline::PipelineError;
use crate::upstream::FetchError;

/// Anything that stops a request before finalization.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Pool(#[from] StreamError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Body(_) if self.body_too_large() => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerError::BadRequest(_) | HandlerError::Body(_) => StatusCode::BAD_REQUEST,
            HandlerError::Fetch(FetchError::InvalidUrl(_))
            | HandlerError::Fetch(FetchError::TooLarge { .. }) => StatusCode::BAD_REQUEST,
            HandlerError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            HandlerError::Fetch(FetchError::Status(404)) => StatusCode::NOT_FOUND,
            HandlerError::Fetch(FetchError::Pool(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::Fetch(_) => StatusCode::BAD_GATEWAY,
            HandlerError::Pipeline(PipelineError::EmptyInput)
            | HandlerError::Pipeline(PipelineError::UnsupportedFormat) => StatusCode::BAD_REQUEST,
            HandlerError::Pipeline(_) | HandlerError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Body(_) if self.body_too_large() => "body_too_large",
            HandlerError::BadRequest(_) | HandlerError::Body(_) => "bad_request",
            HandlerError::Fetch(FetchError::Pool(_)) | HandlerError::Pool(_) => {
                "resource_exhausted"
            }
            HandlerError::Fetch(FetchError::InvalidUrl(_)) => "invalid_url",
            HandlerError::Fetch(FetchError::Timeout) => "upstream_timeout",
            HandlerError::Fetch(FetchError::TooLarge { .. }) => "image_too_large",
            HandlerError::Fetch(_) => "upstream",
            HandlerError::Pipeline(e) if e.is_resource_exhausted() => "resource_exhausted",
            HandlerError::Pipeline(PipelineError::EmptyInput)
            | HandlerError::Pipeline(PipelineError::UnsupportedFormat) => "invalid_image",
            HandlerError::Pipeline(_) => "pipeline",
        }
    }

    /// True when a streamed body ran past the request body limit.
    fn body_too_large(&self) -> bool {
        let HandlerError::Body(err) = self else {
            return false;
        };
        let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(err);
        while let Some(e) = cause {
            if e.is::<LengthLimitError>() {
                return true;
            }
            cause = e.source();
        }
        false
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        metrics::record_error(self.kind());

        // Pool and pipeline internals stay out of the body
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::warn!(error = %self, kind = self.kind(), "Request rejected");
            self.to_string()
        };

        let body = json!({
            "status": "error",
            "code": status.as_u16(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            HandlerError::BadRequest("missing url").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::from(FetchError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            HandlerError::from(FetchError::Status(404)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HandlerError::from(FetchError::Status(500)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            HandlerError::from(PipelineError::UnsupportedFormat).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::from(StreamError::SegmentLimit { limit: 1 }).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_oversized_source_is_client_error() {
        let err = HandlerError::from(FetchError::TooLarge { limit: 8 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "image_too_large");
    }

    #[test]
    fn test_other_body_errors_are_bad_request() {
        let err = HandlerError::Body(axum::Error::new(std::io::Error::other("reset")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "bad_request");
    }

    #[test]
    fn test_exhausted_output_is_internal() {
        let io_err: std::io::Error = StreamError::SegmentLimit { limit: 1 }.into();
        let err = HandlerError::from(PipelineError::Write(io_err));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "resource_exhausted");
    }

    #[test]
    fn test_error_body_is_json() {
        let response = HandlerError::BadRequest("missing url argument").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}

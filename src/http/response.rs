//! Outgoing response head.
//!
//! # Responsibilities
//! - Hold the header table a finalizer commits into
//! - Keep content type and length as dedicated fields, apart from the map
//! - Assemble the final `axum` response from head and body
//!
//! # Design Decisions
//! - Content-Type and Content-Length are written from their fields only, so a
//!   stale copy left in the map can never be emitted twice

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

/// Status, content metadata and extra headers of a response under construction.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub content_length: Option<u64>,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: None,
            content_length: None,
            headers: HeaderMap::new(),
        }
    }

    /// Set the content type and drop any stale entry from the header table.
    pub fn set_content_type(&mut self, value: HeaderValue) {
        self.headers.remove(header::CONTENT_TYPE);
        self.content_type = Some(value);
    }

    /// Set the content length and drop any entry set earlier in the table.
    pub fn set_content_length(&mut self, length: u64) {
        if self.headers.remove(header::CONTENT_LENGTH).is_some() {
            tracing::trace!("Discarded preset Content-Length header");
        }
        self.content_length = Some(length);
    }

    pub fn into_response(self, body: Body) -> Response {
        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.extend(self.headers);
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(length) = self.content_length {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        }
        response
    }
}

impl Default for ResponseHead {
    fn default() -> Self {
        Self::new()
    }
}

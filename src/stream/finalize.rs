//! Response finalization.

use std::time::SystemTime;

use axum::http::{HeaderValue, StatusCode};

use crate::config::CacheConfig;
use crate::http::headers::{emit_cache_headers, emit_content_disposition, emit_link};
use crate::http::mime::{mime_type_for, APPLICATION_JSON};
use crate::http::response::ResponseHead;
use crate::pool::Chain;
use crate::stream::context::ResponseContext;
use crate::stream::max_age::{resolve_max_age, MAX_AGE_DEFAULT};
use crate::stream::policy::HeaderPolicy;
use crate::stream::sink::ByteSink;

/// Seals a sink's chain and commits the response head describing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFinalizer {
    default_max_age: u64,
}

impl ResponseFinalizer {
    pub fn new(default_max_age: u64) -> Self {
        Self { default_max_age }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_max_age_secs)
    }

    pub fn finalize(
        &self,
        sink: ByteSink<'_>,
        ctx: &ResponseContext,
        head: &mut ResponseHead,
    ) -> Chain {
        self.finalize_at(sink, ctx, head, SystemTime::now())
    }

    /// Same as [`finalize`](Self::finalize) with an explicit clock for Expires.
    ///
    /// Consuming the sink makes this the last operation on it.
    pub fn finalize_at(
        &self,
        sink: ByteSink<'_>,
        ctx: &ResponseContext,
        head: &mut ResponseHead,
        now: SystemTime,
    ) -> Chain {
        let mime = mime_type_for(ctx.extension());

        head.status = StatusCode::OK;
        head.set_content_type(HeaderValue::from_static(mime));
        head.set_content_length(sink.total_length());

        let policy = HeaderPolicy::decide(
            ctx.base64(),
            mime == APPLICATION_JSON,
            ctx.upstream().is_some(),
        );
        if policy.content_disposition {
            emit_content_disposition(head, ctx.extension(), ctx.filename());
        }
        if let Some(upstream) = ctx.upstream().filter(|_| policy.link) {
            emit_link(head, upstream.url());
        }

        let max_age = resolve_max_age(ctx.max_age(), self.default_max_age);
        emit_cache_headers(head, max_age, now);

        let total_length = sink.total_length();
        let segments = sink.segment_count();
        let chain = sink.seal();

        tracing::debug!(
            mime,
            total_length,
            segments,
            max_age,
            disposition = policy.content_disposition,
            link = policy.link,
            "Finalized response"
        );
        chain
    }
}

impl Default for ResponseFinalizer {
    fn default() -> Self {
        Self::new(MAX_AGE_DEFAULT)
    }
}

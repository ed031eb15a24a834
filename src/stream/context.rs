//! Per-request inputs to finalization.

use url::Url;

use crate::http::query::{client_requested_base64, requested_filename, QueryArgs};

/// Record of a remote fetch that produced the input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamContext {
    url: Url,
}

impl UpstreamContext {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// The source URL that was fetched.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Read-only facts the finalizer derives response metadata from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    extension: String,
    base64: bool,
    upstream: Option<UpstreamContext>,
    max_age: Option<String>,
    filename: Option<String>,
}

impl ResponseContext {
    /// Context for an output with the given extension and no request flags.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            base64: false,
            upstream: None,
            max_age: None,
            filename: None,
        }
    }

    /// Build the context from the request's query arguments.
    pub fn from_query(
        extension: impl Into<String>,
        args: &QueryArgs,
        upstream: Option<UpstreamContext>,
    ) -> Self {
        Self {
            extension: extension.into(),
            base64: client_requested_base64(args),
            upstream,
            max_age: args.get("maxage").map(str::to_owned),
            filename: requested_filename(args).map(str::to_owned),
        }
    }

    pub fn with_base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    pub fn with_upstream(mut self, upstream: UpstreamContext) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_max_age(mut self, raw: impl Into<String>) -> Self {
        self.max_age = Some(raw.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn base64(&self) -> bool {
        self.base64
    }

    pub fn upstream(&self) -> Option<&UpstreamContext> {
        self.upstream.as_ref()
    }

    pub fn max_age(&self) -> Option<&str> {
        self.max_age.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

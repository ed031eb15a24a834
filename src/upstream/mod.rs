//! Upstream image fetching.
//!
//! # Responsibilities
//! - Normalize the client's `url` argument
//! - Fetch the origin with a bounded timeout and size
//! - Land each received chunk in the request pool as its own segment
//!
//! # Design Decisions
//! - No retries: a failed fetch fails the request
//! - Redirects are followed by the HTTP client

pub mod client;

pub use client::{normalize_url, FetchError, UpstreamClient};

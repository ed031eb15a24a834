//! Header-writing primitives.
//!
//! Each function commits exactly one header family from values that were
//! already decided by the caller.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderValue};
use url::Url;

use crate::http::response::ResponseHead;

/// Base name used in Content-Disposition when the client supplies none.
pub const DEFAULT_FILENAME: &str = "image";

/// Latest instant an IMF-fixdate can express (9999-12-31T23:59:59Z).
const LATEST_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// `Content-Disposition: inline; filename=<name>.<extension>`
pub fn emit_content_disposition(head: &mut ResponseHead, extension: &str, filename: Option<&str>) {
    let value = format!(
        "inline; filename={}.{}",
        filename.unwrap_or(DEFAULT_FILENAME),
        extension
    );
    match HeaderValue::from_str(&value) {
        Ok(value) => {
            head.headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(_) => tracing::warn!(extension = %extension, "Skipping unrepresentable Content-Disposition"),
    }
}

/// `Link: <url>; rel="canonical"`
pub fn emit_link(head: &mut ResponseHead, url: &Url) {
    let value = format!("<{}>; rel=\"canonical\"", url);
    match HeaderValue::from_str(&value) {
        Ok(value) => {
            head.headers.insert(header::LINK, value);
        }
        Err(_) => tracing::warn!(url = %url, "Skipping unrepresentable Link header"),
    }
}

/// `Cache-Control: public, max-age=<n>` and the matching `Expires`.
///
/// Expires saturates at the last representable HTTP date; Cache-Control
/// always carries the exact lifetime.
pub fn emit_cache_headers(head: &mut ResponseHead, max_age: u64, now: SystemTime) {
    head.headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("public, max-age={}", max_age))
            .unwrap_or_else(|_| HeaderValue::from_static("public")),
    );

    let latest = UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECS);
    let expires = now
        .checked_add(Duration::from_secs(max_age))
        .filter(|at| *at <= latest)
        .unwrap_or(latest)
        .max(UNIX_EPOCH);

    if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(expires)) {
        head.headers.insert(header::EXPIRES, value);
    }
}

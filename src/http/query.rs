//! Query argument access.

use axum::http::Uri;

/// Decoded query arguments of a request, in the order they appeared.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pairs: Vec<(String, String)>,
}

impl QueryArgs {
    pub fn from_uri(uri: &Uri) -> Self {
        Self::parse(uri.query().unwrap_or_default())
    }

    pub fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// First value for `name`, if the argument is present at all.
    ///
    /// Names match ASCII case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// True when the client asked for the output wrapped as a base64 data URI.
pub fn client_requested_base64(args: &QueryArgs) -> bool {
    args.get("encoding")
        .is_some_and(|value| value.eq_ignore_ascii_case("base64"))
}

/// A Content-Disposition base name: ASCII alphanumerics, `-` and `_` only.
pub fn requested_filename(args: &QueryArgs) -> Option<&str> {
    args.get("filename").filter(|name| {
        !name.is_empty()
            && name.len() <= 128
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

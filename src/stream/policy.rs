//! Conditional header decisions.

/// Which optional headers a response carries.
///
/// | base64 | json | upstream | disposition | link |
/// |--------|------|----------|-------------|------|
/// | no     | no   | –        | yes         | –    |
/// | yes    | –    | –        | no          | –    |
/// | –      | yes  | –        | no          | –    |
/// | –      | –    | yes      | –           | yes  |
/// | –      | –    | no       | –           | no   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPolicy {
    pub content_disposition: bool,
    pub link: bool,
}

impl HeaderPolicy {
    /// Evaluate the table once, before any header is written.
    pub fn decide(base64: bool, mime_is_json: bool, upstream_present: bool) -> Self {
        Self {
            // Base64 output embeds the image inline and JSON is a description,
            // neither is a file to save.
            content_disposition: !base64 && !mime_is_json,
            link: upstream_present,
        }
    }
}

//! Extension to MIME type lookup.

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the MIME type for an output extension.
///
/// Total over all inputs: unknown extensions map to
/// `application/octet-stream`. A leading dot and letter case are ignored.
pub fn mime_type_for(extension: &str) -> &'static str {
    let extension = extension.trim_start_matches('.');
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        "heic" | "heif" => "image/heif",
        "svg" => "image/svg+xml",
        "json" => APPLICATION_JSON,
        "txt" => "text/plain",
        _ => APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_type_for("jpg"), "image/jpeg");
        assert_eq!(mime_type_for("jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("gif"), "image/gif");
        assert_eq!(mime_type_for("json"), APPLICATION_JSON);
        assert_eq!(mime_type_for(".PNG"), "image/png");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(mime_type_for("exe"), APPLICATION_OCTET_STREAM);
        assert_eq!(mime_type_for(""), APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_lookup_is_stable() {
        for ext in ["webp", "tiff", "bogus"] {
            assert_eq!(mime_type_for(ext), mime_type_for(ext));
        }
    }
}

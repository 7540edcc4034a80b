//! Extension -> content-type lookup used when writing objects.

const DEFAULT: &str = "application/octet-stream";

pub fn content_type_for(path: &str) -> &'static str {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return DEFAULT;
    };
    if ext.contains('/') {
        // dot in a directory name, not an extension
        return DEFAULT;
    }
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "md" => "text/markdown",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "woff2" => "font/woff2",
        _ => DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for("a/b/c.txt"), "text/plain");
        assert_eq!(content_type_for("data.JSON"), "application/json");
        assert_eq!(content_type_for("pic.jpeg"), "image/jpeg");
    }

    #[test]
    fn test_unknown_and_missing_extensions_default() {
        assert_eq!(content_type_for("binary.bin"), DEFAULT);
        assert_eq!(content_type_for("noext"), DEFAULT);
        assert_eq!(content_type_for("dir.v2/noext"), DEFAULT);
    }
}

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// File extension used when a portrait is written to disk.
pub fn export_extension(mime_type: &str) -> &'static str {
    if mime_type.contains("png") {
        "png"
    } else {
        "jpg"
    }
}

//! Plain-text extraction for uploaded documents

use std::path::Path;

/// Extensions read as plain text
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "md"];

/// Why an upload could not be turned into text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("no file uploaded")]
    NoFile,

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
}

/// Whether an upload can be read as plain text
pub fn is_plain_text(file_name: &str, content_type: Option<&str>) -> bool {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);

    let by_mime = content_type
        .map(|m| m.trim().to_lowercase().starts_with("text/"))
        .unwrap_or(false);

    by_extension || by_mime
}

/// Decode uploaded bytes, replacing invalid UTF-8 and dropping a BOM
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_by_extension() {
        assert!(is_plain_text("contract.txt", None));
        assert!(is_plain_text("NOTES.MD", None));
        assert!(!is_plain_text("contract.pdf", None));
        assert!(!is_plain_text("contract", None));
    }

    #[test]
    fn test_plain_text_by_mime() {
        assert!(is_plain_text("upload", Some("text/plain; charset=utf-8")));
        assert!(!is_plain_text("upload.docx", Some("application/octet-stream")));
    }

    #[test]
    fn test_decode_text_strips_bom() {
        assert_eq!(decode_text("\u{feff}Clause 1".as_bytes()), "Clause 1");
    }

    #[test]
    fn test_decode_text_is_lossy() {
        assert_eq!(decode_text(&[b'o', b'k', 0xff]), "ok\u{fffd}");
    }
}

//! Content-based media format classification.
//!
//! Classifies raw bytes by magic numbers, never by caller-supplied
//! filenames or extensions, so an uploaded payload cannot spoof its
//! format through a renamed file.

use crate::media::Format;
use uuid::Uuid;

/// Sniffed content type of a byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    /// Repository format bucket for the payload.
    pub format: Format,
    /// Detected MIME type.
    pub mime: &'static str,
    /// Canonical file extension, without the leading dot; empty when the
    /// content is unrecognized.
    pub extension: &'static str,
}

/// Classify a byte payload from its content alone.
pub fn sniff(bytes: &[u8]) -> ContentType {
    let Some(kind) = infer::get(bytes) else {
        return ContentType {
            format: Format::Unknown,
            mime: "application/octet-stream",
            extension: "",
        };
    };

    let format = match kind.mime_type() {
        "image/jpeg" | "image/png" => Format::Image,
        "image/apng" | "image/vnd.mozilla.apng" | "image/gif" | "image/webp" => {
            Format::AnimatedImage
        }
        _ => Format::Unknown,
    };

    ContentType {
        format,
        mime: kind.mime_type(),
        extension: kind.extension(),
    }
}

/// Storage filename for a payload: the record ID plus the sniffed
/// extension, when one is known.
pub fn storage_name(id: Uuid, content: &ContentType) -> String {
    if content.extension.is_empty() {
        id.to_string()
    } else {
        format!("{}.{}", id, content.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal magic-number prefixes; sniffing never reads past the header.
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    #[test]
    fn test_still_images_classify_as_image() {
        assert_eq!(sniff(JPEG).format, Format::Image);
        assert_eq!(sniff(JPEG).extension, "jpg");
        assert_eq!(sniff(PNG).format, Format::Image);
    }

    #[test]
    fn test_animated_images_classify_as_animated() {
        let sniffed = sniff(GIF);
        assert_eq!(sniffed.format, Format::AnimatedImage);
        assert_eq!(sniffed.mime, "image/gif");
    }

    #[test]
    fn test_unrecognized_bytes_classify_as_unknown() {
        let sniffed = sniff(b"not an image at all");
        assert_eq!(sniffed.format, Format::Unknown);
        assert_eq!(sniffed.extension, "");
    }

    #[test]
    fn test_sniffing_is_deterministic() {
        assert_eq!(sniff(JPEG), sniff(JPEG));
        assert_eq!(sniff(b""), sniff(b""));
    }

    #[test]
    fn test_storage_name_appends_extension() {
        let id = Uuid::new_v4();
        let name = storage_name(id, &sniff(JPEG));
        assert_eq!(name, format!("{}.jpg", id));

        let name = storage_name(id, &sniff(b"garbage"));
        assert_eq!(name, id.to_string());
    }
}

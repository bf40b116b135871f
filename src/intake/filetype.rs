//! Content-type detection by magic bytes.
//!
//! Uploads are typed by what their bytes actually are, never by the declared
//! `Content-Type` or the filename. The declared type is only logged when it
//! disagrees with the sniffed one.

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const PDF_MAGIC: &[u8] = b"%PDF";
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
/// OLE2 compound document header, used by legacy `.doc` files.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// How far into a ZIP container we look for OOXML entry names.
const OOXML_SNIFF_WINDOW: usize = 4096;

/// Container kind recognized from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedKind {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Zip,
    OleDocument,
    Unknown,
}

impl DetectedKind {
    /// Canonical MIME for the container; `None` when undetectable.
    pub fn mime(self) -> Option<&'static str> {
        match self {
            DetectedKind::Pdf => Some(MIME_PDF),
            DetectedKind::Png => Some(MIME_PNG),
            DetectedKind::Jpeg => Some(MIME_JPEG),
            DetectedKind::Gif => Some(MIME_GIF),
            DetectedKind::Zip => Some(MIME_ZIP),
            DetectedKind::OleDocument => Some(MIME_DOC),
            DetectedKind::Unknown => None,
        }
    }

    /// Preferred filename extension for storage.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            DetectedKind::Pdf => Some("pdf"),
            DetectedKind::Png => Some("png"),
            DetectedKind::Jpeg => Some("jpg"),
            DetectedKind::Gif => Some("gif"),
            DetectedKind::Zip => Some("zip"),
            DetectedKind::OleDocument => Some("doc"),
            DetectedKind::Unknown => None,
        }
    }
}

/// Detect the container kind from the leading bytes of `buf`.
pub fn detect(buf: &[u8]) -> DetectedKind {
    if buf.starts_with(PDF_MAGIC) {
        DetectedKind::Pdf
    } else if buf.starts_with(PNG_MAGIC) {
        DetectedKind::Png
    } else if buf.starts_with(JPEG_MAGIC) {
        DetectedKind::Jpeg
    } else if buf.starts_with(GIF87_MAGIC) || buf.starts_with(GIF89_MAGIC) {
        DetectedKind::Gif
    } else if buf.starts_with(ZIP_MAGIC) {
        DetectedKind::Zip
    } else if buf.starts_with(OLE_MAGIC) {
        DetectedKind::OleDocument
    } else {
        DetectedKind::Unknown
    }
}

/// Whether a ZIP container looks like an OOXML Word document. ZIP local file
/// headers carry entry names inline, so the markers show up near the front.
pub fn zip_looks_like_docx(buf: &[u8]) -> bool {
    let window = &buf[..buf.len().min(OOXML_SNIFF_WINDOW)];
    contains(window, b"word/") || contains(window, b"[Content_Types].xml")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len().max(1))
        .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf() {
        assert_eq!(detect(b"%PDF-1.7 rest of file"), DetectedKind::Pdf);
        assert_eq!(detect(b"%PDF").mime(), Some(MIME_PDF));
    }

    #[test]
    fn detects_images() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(detect(&png), DetectedKind::Png);
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect(&jpeg), DetectedKind::Jpeg);
        assert_eq!(detect(b"GIF89a...."), DetectedKind::Gif);
        assert_eq!(detect(b"GIF87a...."), DetectedKind::Gif);
        assert_eq!(detect(b"GIF89a").mime(), Some(MIME_GIF));
    }

    #[test]
    fn detects_archives_and_legacy_doc() {
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert_eq!(detect(&zip), DetectedKind::Zip);
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert_eq!(detect(&ole), DetectedKind::OleDocument);
        assert_eq!(detect(&ole).mime(), Some(MIME_DOC));
    }

    #[test]
    fn unknown_for_unrecognized_bytes() {
        assert_eq!(detect(b"hello world"), DetectedKind::Unknown);
        assert_eq!(detect(&[]), DetectedKind::Unknown);
        assert_eq!(detect(b"hello").mime(), None);
    }

    #[test]
    fn recognizes_ooxml_markers_in_zip() {
        let mut docx = vec![0x50, 0x4B, 0x03, 0x04];
        docx.extend_from_slice(b"\x14\x00\x00\x00[Content_Types].xml more data");
        assert!(zip_looks_like_docx(&docx));

        let mut with_word = vec![0x50, 0x4B, 0x03, 0x04];
        with_word.extend_from_slice(b"\x14\x00word/document.xml");
        assert!(zip_looks_like_docx(&with_word));

        let plain = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x61, 0x2E, 0x74, 0x78, 0x74];
        assert!(!zip_looks_like_docx(&plain));
    }
}

//! Upload validation: per-field size and content-type policy plus the
//! virus-scan hop.
//!
//! Files are written to disk first and deleted again when any check fails, so
//! a rejection never leaves bytes behind. Accepted files keep a randomized
//! name under a per-category directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::filetype::{
    self, DetectedKind, MIME_DOC, MIME_DOCX, MIME_JPEG, MIME_PDF, MIME_PNG, MIME_ZIP,
};
use super::scanner::{ScanOutcome, VirusScanner};

pub const RESUME_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const ATTACHMENT_MAX_BYTES: usize = 50 * 1024 * 1024;

const RESUME_MIMES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX];
const ATTACHMENT_MIMES: &[&str] = &[MIME_PDF, MIME_JPEG, MIME_PNG, MIME_ZIP];

/// Upload slots accepted by the API, each with its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Resume,
    Portfolio,
    OfferLetter,
}

impl UploadField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "resume" => Some(Self::Resume),
            "portfolio" => Some(Self::Portfolio),
            "offerLetter" => Some(Self::OfferLetter),
            _ => None,
        }
    }

    /// Field name as it appears in multipart forms and error payloads.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Portfolio => "portfolio",
            Self::OfferLetter => "offerLetter",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Resume => RESUME_MAX_BYTES,
            Self::Portfolio | Self::OfferLetter => ATTACHMENT_MAX_BYTES,
        }
    }

    /// Subdirectory of the upload root this field's files land in.
    pub fn category(self) -> &'static str {
        match self {
            Self::Resume => "resumes",
            Self::Portfolio => "portfolios",
            Self::OfferLetter => "offers",
        }
    }

    fn allowed_mimes(self) -> &'static [&'static str] {
        match self {
            Self::Resume => RESUME_MIMES,
            Self::Portfolio | Self::OfferLetter => ATTACHMENT_MIMES,
        }
    }

    /// Only fields that accept DOCX refine a ZIP container into one.
    fn admits_docx(self) -> bool {
        matches!(self, Self::Resume)
    }
}

pub const UPLOAD_CATEGORIES: &[&str] = &["resumes", "portfolios", "offers"];

/// A file that survived validation and now lives on disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub field: UploadField,
    pub path: PathBuf,
    pub mime: &'static str,
    pub original_name: String,
    pub size: u64,
}

/// Policy rejection for a single file; maps to a per-field 400 message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("File type \"{0}\" is not allowed")]
    DisallowedType(&'static str),
    #[error("File type could not be determined")]
    UnknownType,
    #[error("File exceeds maximum size of {0}MB")]
    TooLarge(usize),
    #[error("File failed virus scan ({0})")]
    Infected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] UploadRejection),
    #[error("upload storage failed: {0}")]
    Io(#[from] io::Error),
}

/// Validates uploads against field policy and the virus scanner, owning the
/// on-disk layout under the upload root.
pub struct UploadValidator<S> {
    scanner: Arc<S>,
    root: PathBuf,
}

impl<S: VirusScanner> UploadValidator<S> {
    pub fn new(scanner: Arc<S>, root: PathBuf) -> Self {
        Self { scanner, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the per-category directories; called once at startup.
    pub async fn ensure_directories(&self) -> io::Result<()> {
        for category in UPLOAD_CATEGORIES {
            tokio::fs::create_dir_all(self.root.join(category)).await?;
        }
        Ok(())
    }

    /// Run the full pipeline for one file: size cap, write to disk, magic-byte
    /// policy, virus scan. Any failure after the write deletes the file again.
    pub async fn validate_and_store(
        &self,
        field: UploadField,
        original_name: &str,
        declared_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if bytes.len() > field.max_bytes() {
            return Err(UploadRejection::TooLarge(field.max_bytes() / (1024 * 1024)).into());
        }

        let path = self
            .root
            .join(field.category())
            .join(format!("{}.{}", Uuid::new_v4(), storage_extension(original_name)));
        tokio::fs::write(&path, bytes).await?;

        let mime = match resolve_mime(field, original_name, bytes) {
            Ok(mime) => mime,
            Err(rejection) => {
                remove_quietly(&path).await;
                return Err(rejection.into());
            }
        };

        if let Some(declared) = declared_type.and_then(|raw| raw.parse::<mime::Mime>().ok()) {
            if declared.essence_str() != mime {
                debug!(declared = %declared, detected = mime, "declared content type differs from sniffed type");
            }
        }

        match self.scanner.scan(bytes).await {
            ScanOutcome::Infected(signature) => {
                remove_quietly(&path).await;
                return Err(UploadRejection::Infected(signature).into());
            }
            ScanOutcome::Clean => {}
            // Fail open: an unavailable or failing scanner never blocks intake.
            ScanOutcome::Skipped(reason) => {
                debug!(%reason, "virus scan skipped");
            }
        }

        Ok(StoredUpload {
            field,
            path,
            mime,
            original_name: original_name.to_string(),
            size: bytes.len() as u64,
        })
    }

    /// Delete files stored earlier in a request whose later parts failed.
    pub async fn discard(&self, uploads: &[StoredUpload]) {
        for upload in uploads {
            remove_quietly(&upload.path).await;
        }
    }
}

fn resolve_mime(
    field: UploadField,
    original_name: &str,
    bytes: &[u8],
) -> Result<&'static str, UploadRejection> {
    let kind = filetype::detect(bytes);
    let mime = match kind {
        DetectedKind::Unknown => {
            // Legacy Word files predating the OLE container sniff poorly;
            // accept them on extension alone.
            if original_name.to_ascii_lowercase().ends_with(".doc") {
                MIME_DOC
            } else {
                return Err(UploadRejection::UnknownType);
            }
        }
        DetectedKind::Zip => {
            if field.admits_docx() && filetype::zip_looks_like_docx(bytes) {
                MIME_DOCX
            } else {
                MIME_ZIP
            }
        }
        other => other.mime().ok_or(UploadRejection::UnknownType)?,
    };

    if field.allowed_mimes().contains(&mime) {
        Ok(mime)
    } else {
        Err(UploadRejection::DisallowedType(mime))
    }
}

/// Extension for the stored filename, taken from the client name but reduced
/// to a short alphanumeric token.
fn storage_extension(original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("");
    let cleaned: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), %err, "failed to delete rejected upload");
        }
    }
}

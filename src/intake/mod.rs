//! Public application-intake pipeline.
//!
//! Everything a submission passes through before it becomes an applicant row:
//! the spam heuristic, HTML sanitization, magic-byte upload validation, and
//! the fail-open virus-scan adapter.

pub mod filetype;
pub mod sanitizer;
pub mod scanner;
pub mod spam;
pub mod upload;

pub use sanitizer::{sanitize_rich_text, strip_html};
pub use scanner::{ClamdScanner, ScanOutcome, VirusScanner};
pub use spam::{resolve_client_ip, SpamCheckInput, SpamFilter, SpamVerdict};
pub use upload::{StoredUpload, UploadError, UploadField, UploadRejection, UploadValidator};

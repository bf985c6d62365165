//! Diagnostics module.
//!
//! Stable error codes with message templates, and rendering of a diagnostic
//! as a one-line short message or a caret-annotated multi-line message.

pub mod colors;
pub mod diagnostic;
pub mod error_codes;
pub mod format;
pub mod suggestions;

pub use diagnostic::{DEFAULT_STORY_NAME, Diagnostic, REPORT_URL, source_line};
pub use error_codes::{ERROR_CODES, ErrorCategory, ErrorCode, Severity, lookup_error_code};
pub use format::format_message;

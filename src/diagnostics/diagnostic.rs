use std::fmt;

use crate::syntax::position::Position;

use super::colors::Colors;
use super::error_codes::{ErrorCategory, ErrorCode, INTERNAL_ERROR, Severity};
use super::format::format_message;

pub const REPORT_URL: &str = "https://github.com/storyscript/storyscript/issues";

/// Name used for a story compiled from a bare string.
pub const DEFAULT_STORY_NAME: &str = "story";

// ICE = Internal Compiler Error. The detail is kept for verbose logs only;
// the diagnostic built from it never shows it.
#[macro_export]
macro_rules! ice {
    ($($arg:tt)*) => {
        $crate::CompileError::Internal(format!(
            "{} ({}:{})",
            format!($($arg)*),
            file!(),
            line!()
        ))
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    error_code: &'static ErrorCode,
    text: String,
    story: String,
    position: Option<Position>,
    source_line: Option<String>,
}

impl Diagnostic {
    pub fn new<S: AsRef<str>>(error_code: &'static ErrorCode, args: &[S]) -> Self {
        Self {
            error_code,
            text: format_message(error_code.message, args),
            story: DEFAULT_STORY_NAME.to_string(),
            position: None,
            source_line: None,
        }
    }

    /// The opaque internal-error diagnostic; it carries no fault detail.
    pub fn internal() -> Self {
        Self::new::<&str>(&INTERNAL_ERROR, &[])
    }

    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = story.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }

    /// Attach the source line the position points at, taken from the full story text.
    pub fn with_source(mut self, source: &str) -> Self {
        if let Some(position) = self.position
            && let Some(line) = source_line(source, position.line)
        {
            self.source_line = Some(line.to_string());
        }
        self
    }

    pub fn error_code(&self) -> &'static ErrorCode {
        self.error_code
    }

    /// Numeric part of the code: `E0007` gives 7.
    pub fn code(&self) -> u16 {
        self.error_code
            .code
            .trim_start_matches('E')
            .parse()
            .unwrap_or_default()
    }

    pub fn code_str(&self) -> &'static str {
        self.error_code.code
    }

    pub fn severity(&self) -> Severity {
        self.error_code.severity
    }

    pub fn category(&self) -> ErrorCategory {
        self.error_code.category
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.position.map(|p| p.column)
    }

    /// The filled-in message template without the code.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn short_message(&self) -> String {
        format!("{}: {}", self.error_code.code, self.text)
    }

    /// Full multi-line rendering without colour.
    pub fn message(&self) -> String {
        self.render(&Colors::plain())
    }

    /// Full rendering with ANSI colour, unless `NO_COLOR` is set.
    pub fn colored_message(&self) -> String {
        self.render(&Colors::from_env())
    }

    fn render(&self, colors: &Colors) -> String {
        if self.category() == ErrorCategory::Internal {
            return format!(
                "{}{}{}\nPlease report at {}",
                colors.bold,
                self.short_message(),
                colors.reset,
                REPORT_URL
            );
        }

        let label_color = match self.severity() {
            Severity::Error => colors.red,
            Severity::Warning => colors.yellow,
            Severity::Deprecation => colors.cyan,
        };
        let description = match self.severity() {
            Severity::Error => self.category().description(),
            _ => self.error_code.title,
        };

        let mut out = format!(
            "{}{}{}: {} in {}",
            label_color,
            self.severity().label(),
            colors.reset,
            description,
            self.story
        );
        if let Some(position) = self.position {
            out.push_str(&format!(
                " at line {}, column {}",
                position.line, position.column
            ));
            if let Some(line) = &self.source_line {
                let prefix = format!("{}|    ", position.line);
                // tabs stay tabs so the caret lines up under any tab width
                let mut pad = " ".repeat(prefix.chars().count());
                let mut chars = line.chars();
                pad.extend((1..position.column).map(|_| match chars.next() {
                    Some('\t') => '\t',
                    _ => ' ',
                }));
                out.push_str(&format!(
                    "\n\n{}{}\n{}{}^{}",
                    prefix, line, pad, colors.red, colors.reset
                ));
            }
        }
        out.push_str(&format!(
            "\n\n{}{}{}",
            colors.bold,
            self.short_message(),
            colors.reset
        ));
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for Diagnostic {}

/// 1-based line lookup; `\r\n` endings are trimmed.
pub fn source_line(source: &str, line: usize) -> Option<&str> {
    source
        .split('\n')
        .nth(line.checked_sub(1)?)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::error_codes::{ASSIGNMENT_INCOMPLETE, HASH_COMMENT, SERVICE_NOT_FOUND};

    #[test]
    fn code_is_numeric() {
        let diag = Diagnostic::new::<&str>(&ASSIGNMENT_INCOMPLETE, &[]);
        assert_eq!(diag.code(), 7);
        assert_eq!(diag.code_str(), "E0007");
        assert!(diag.is_error());
    }

    #[test]
    fn renders_without_position() {
        let diag = Diagnostic::new(&SERVICE_NOT_FOUND, &["http"]);
        assert_eq!(
            diag.message(),
            "Error: semantic error in story\n\nE0139: Service `http` does not exist on the hub."
        );
    }

    #[test]
    fn non_error_headers_use_the_title() {
        let diag = Diagnostic::new::<&str>(&HASH_COMMENT, &[])
            .with_story("a.story")
            .with_position(Position::new(2, 1));
        assert!(
            diag.message()
                .starts_with("Deprecation: hash comment in a.story at line 2, column 1")
        );
    }

    #[test]
    fn internal_error_is_opaque() {
        let diag = Diagnostic::internal().with_story("x.story");
        assert_eq!(
            diag.message(),
            format!("E0001: Internal error occurred\nPlease report at {}", REPORT_URL)
        );
    }

    #[test]
    fn source_line_lookup() {
        assert_eq!(source_line("a\r\nb\nc", 1), Some("a"));
        assert_eq!(source_line("a\nb", 2), Some("b"));
        assert_eq!(source_line("a", 0), None);
        assert_eq!(source_line("a", 3), None);
    }
}

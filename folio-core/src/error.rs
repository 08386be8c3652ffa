use std::fmt;
use std::path::PathBuf;

use crate::config::ConfigError;

// Re-export Span from shared types
pub use folio_types::Span;

/// Errors that can occur while compiling a folio document
///
/// Every variant maps to a fixed exit code (see [`FolioError::exit_code`]),
/// which the command-line driver surfaces under the strict error policy.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("No function or variable named .{name}")]
    UnresolvedReference { name: String },

    #[error("Invalid call to .{function}: {reason}")]
    InvalidFunctionCall { function: String, reason: String },

    #[error("Cannot convert '{value}' to {expected} for parameter '{parameter}'")]
    IllegalTypeConversion {
        parameter: String,
        expected: String,
        value: String,
    },

    #[error("No such element '{element}' (expected one of: {candidates})")]
    NoSuchElement { element: String, candidates: String },

    #[error("Error in .{function}: {message}")]
    Runtime { function: String, message: String },

    #[error("Invalid expression evaluation: {message}")]
    InvalidExpression { message: String },

    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Localization { message: String },

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{message}")]
    Pipeline { message: String },
}

pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    pub fn invalid_call(function: impl Into<String>, reason: impl Into<String>) -> Self {
        FolioError::InvalidFunctionCall {
            function: function.into(),
            reason: reason.into(),
        }
    }

    pub fn runtime(function: impl Into<String>, message: impl Into<String>) -> Self {
        FolioError::Runtime {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn invalid_expression(message: impl Into<String>) -> Self {
        FolioError::InvalidExpression {
            message: message.into(),
        }
    }

    pub fn localization(message: impl Into<String>) -> Self {
        FolioError::Localization {
            message: message.into(),
        }
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        FolioError::Pipeline {
            message: message.into(),
        }
    }

    /// Process exit code carried by this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            FolioError::Pipeline { .. } => 1,
            FolioError::UnresolvedReference { .. } => 10,
            FolioError::InvalidFunctionCall { .. } => 11,
            FolioError::IllegalTypeConversion { .. } => 12,
            FolioError::NoSuchElement { .. } => 13,
            FolioError::Runtime { .. } => 14,
            FolioError::InvalidExpression { .. } => 15,
            FolioError::Io { .. } => 20,
            FolioError::Localization { .. } => 30,
            FolioError::Config(_) => 40,
        }
    }

    /// Short human-readable name of the error kind
    pub fn title(&self) -> &'static str {
        match self {
            FolioError::UnresolvedReference { .. } => "Unresolved reference",
            FolioError::InvalidFunctionCall { .. } => "Invalid function call",
            FolioError::IllegalTypeConversion { .. } => "Illegal type conversion",
            FolioError::NoSuchElement { .. } => "No such element",
            FolioError::Runtime { .. } => "Runtime error",
            FolioError::InvalidExpression { .. } => "Invalid expression",
            FolioError::Io { .. } => "I/O error",
            FolioError::Localization { .. } => "Localization error",
            FolioError::Config(_) => "Configuration error",
            FolioError::Pipeline { .. } => "Pipeline error",
        }
    }

    /// Message rendered in place of a failing call site
    pub fn rich_message(&self) -> String {
        format!("{}: {}", self.title(), self)
    }
}

/// Display context for better error messages
pub struct ErrorContext<'a> {
    pub source: &'a str,
    pub error: &'a FolioError,
    pub span: Span,
}

impl<'a> ErrorContext<'a> {
    pub fn new(source: &'a str, error: &'a FolioError, span: Span) -> Self {
        Self { source, error, span }
    }

    /// Get the source line containing the error
    pub fn source_line(&self) -> Option<&'a str> {
        let start = self.clamped_start();

        let line_start = self.source[..start]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);

        let line_end = self.source[start..]
            .find('\n')
            .map(|pos| start + pos)
            .unwrap_or(self.source.len());

        Some(&self.source[line_start..line_end])
    }

    /// Get line and column numbers (1-indexed)
    pub fn line_col(&self) -> (usize, usize) {
        let start = self.clamped_start();

        let line = self.source[..start].matches('\n').count() + 1;
        let line_start = self.source[..start]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let col = start - line_start + 1;

        (line, col)
    }

    fn clamped_start(&self) -> usize {
        let mut start = self.span.start.min(self.source.len());
        while !self.source.is_char_boundary(start) {
            start -= 1;
        }
        start
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_col();
        writeln!(f, "Error at line {}, column {}:", line, col)?;
        writeln!(f, "  {}", self.error)?;

        if let Some(source_line) = self.source_line() {
            writeln!(f)?;
            writeln!(f, "  {}", source_line)?;
            let col_start = (col - 1).min(source_line.len());
            let width = self.span.len().min(source_line.len() - col_start).max(1);
            let indicator = " ".repeat(col_start) + &"^".repeat(width);
            writeln!(f, "  {}", indicator)?;
        }

        Ok(())
    }
}

//! Diagnostics reported by the lexer, parser and folder.
//!
//! Nothing in the front end stops at the first problem; every stage
//! collects `Diagnostic`s and the caller decides what to do with them.

use alloc::string::String;
use core::fmt;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Stable code such as `E0301`.
    pub code: Option<&'static str>,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            code: None,
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            code: None,
            span,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// `error[E0301]: division by zero in constant expression (bytes 4..9)`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {} ({})", self.message, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;
    use alloc::string::ToString;

    #[test]
    fn renders_code_and_span() {
        let span = Span::new(FileId(0), 4, 9);
        let diag = Diagnostic::error("division by zero in constant expression", span)
            .with_code("E0301");
        assert_eq!(
            diag.to_string(),
            "error[E0301]: division by zero in constant expression (bytes 4..9)"
        );
    }

    #[test]
    fn renders_without_code() {
        let diag = Diagnostic::warning("value truncated", Span::new(FileId(1), 0, 3));
        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "warning: value truncated (bytes 0..3)");
    }
}

//! Error types for template parsing

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `$` at the very end of the input
    #[error("invalid variable name")]
    InvalidName { span: Span },

    /// Input ended inside `${...`
    #[error("unexpected end of string, \"}}\" is missing")]
    UnterminatedBrace { span: Span },

    /// A bracketed name hit a character other than `}`
    #[error("\"}}\" for variable \"{name}\" is missing")]
    MissingBrace { name: String, span: Span },

    /// Reference matches neither a registered name nor a prefix
    #[error("unknown variable \"{name}\"")]
    UnknownVariable { name: String, span: Span },
}

impl ParseError {
    /// Source range of the offending reference
    pub fn span(&self) -> &Span {
        match self {
            ParseError::InvalidName { span }
            | ParseError::UnterminatedBrace { span }
            | ParseError::MissingBrace { span, .. }
            | ParseError::UnknownVariable { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        self.format_with(source, filename, true)
    }

    /// Same as [`ParseError::format`], optionally without ANSI colors
    pub fn format_with(&self, source: &str, filename: &str, color: bool) -> String {
        let message = self.to_string();
        let hint = match self {
            ParseError::InvalidName { .. } => "trailing `$`, write `$$` for a literal dollar",
            ParseError::UnterminatedBrace { .. } | ParseError::MissingBrace { .. } => {
                "reference opened here"
            }
            ParseError::UnknownVariable { .. } => "no variable or prefix matches this name",
        };
        let span = self.span().clone();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(color))
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(hint)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

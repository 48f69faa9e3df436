//! Template tokenizer
//!
//! Drives a three-state machine over the raw lexer tokens:
//!
//! - plain text accumulates until a `$`
//! - the token right after `$` picks bracketed (`${name}`), escaped (`$$`)
//!   or unbracketed (`$name`) form
//! - a bracketed name runs until `}`; an unbracketed name is its first
//!   character (whatever it is) followed by an identifier run
//!
//! Variable names are checked against a lookup callback as soon as they are
//! complete, so the first offending reference in source order is reported.

use crate::error::{ParseError, Span};

use super::lexer::{lex, Token};
use super::template::{Segment, Template};

#[derive(Debug)]
enum State {
    Plain,
    AfterDollar { dollar: usize },
    /// Unbracketed name that started with a non-identifier character and may
    /// still continue with an identifier run
    InName { dollar: usize, start: usize, end: usize },
    InBraces { dollar: usize, name: Option<Span> },
}

struct Builder<'a, F> {
    source: &'a str,
    is_defined: F,
    segments: Vec<Segment>,
    literal: String,
}

impl<'a, F: Fn(&str) -> bool> Builder<'a, F> {
    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            let text = std::mem::take(&mut self.literal);
            self.segments.push(Segment::Literal(text));
        }
    }

    fn push_variable(&mut self, name: Span, whole: Span) -> Result<(), ParseError> {
        let name = &self.source[name];
        if !(self.is_defined)(name) {
            return Err(ParseError::UnknownVariable {
                name: name.to_string(),
                span: whole,
            });
        }
        self.segments.push(Segment::Variable(name.to_string()));
        Ok(())
    }
}

/// Tokenize template text without checking that variables exist
pub fn tokenize(source: &str) -> Result<Template, ParseError> {
    parse_with(source, |_| true)
}

/// Tokenize template text, rejecting references for which `is_defined`
/// returns false
pub fn parse_with<F>(source: &str, is_defined: F) -> Result<Template, ParseError>
where
    F: Fn(&str) -> bool,
{
    let mut builder = Builder {
        source,
        is_defined,
        segments: Vec::new(),
        literal: String::new(),
    };
    let mut state = State::Plain;

    for (token, span) in lex(source) {
        state = match state {
            State::Plain => {
                if token == Token::Dollar {
                    builder.flush_literal();
                    State::AfterDollar { dollar: span.start }
                } else {
                    builder.literal.push_str(&source[span]);
                    State::Plain
                }
            }

            State::AfterDollar { dollar } => match token {
                Token::BraceOpen => State::InBraces { dollar, name: None },
                Token::Dollar => {
                    builder.segments.push(Segment::Literal("$".to_string()));
                    State::Plain
                }
                // The identifier token is already the maximal run, so the
                // reference ends here and the next token is plain text or
                // another `$`.
                Token::Ident => {
                    builder.push_variable(span.clone(), dollar..span.end)?;
                    State::Plain
                }
                // Any other character starts the name, even when it cannot
                // appear in an identifier.
                Token::BraceClose | Token::Text => {
                    let first = source[span.start..]
                        .chars()
                        .next()
                        .map_or(0, char::len_utf8);
                    let end = span.start + first;
                    if end < span.end {
                        // The rest of the token ends the name right away.
                        builder.push_variable(span.start..end, dollar..end)?;
                        builder.literal.push_str(&source[end..span.end]);
                        State::Plain
                    } else {
                        State::InName {
                            dollar,
                            start: span.start,
                            end,
                        }
                    }
                }
            },

            State::InName { dollar, start, end } => match token {
                Token::Ident => {
                    builder.push_variable(start..span.end, dollar..span.end)?;
                    State::Plain
                }
                Token::Dollar => {
                    builder.push_variable(start..end, dollar..end)?;
                    State::AfterDollar { dollar: span.start }
                }
                Token::BraceOpen | Token::BraceClose | Token::Text => {
                    builder.push_variable(start..end, dollar..end)?;
                    builder.literal.push_str(&source[span]);
                    State::Plain
                }
            },

            State::InBraces { dollar, name } => match (token, name) {
                (Token::Ident, None) => State::InBraces {
                    dollar,
                    name: Some(span),
                },
                (Token::BraceClose, Some(name)) => {
                    builder.push_variable(name, dollar..span.end)?;
                    State::Plain
                }
                (Token::BraceClose, None) => {
                    builder.push_variable(span.start..span.start, dollar..span.end)?;
                    State::Plain
                }
                (_, name) => {
                    return Err(ParseError::MissingBrace {
                        name: name.map(|n| source[n].to_string()).unwrap_or_default(),
                        span: dollar..span.end,
                    });
                }
            },
        };
    }

    match state {
        State::Plain => {}
        State::InName { dollar, start, end } => {
            builder.push_variable(start..end, dollar..end)?;
        }
        State::AfterDollar { dollar } => {
            return Err(ParseError::InvalidName {
                span: dollar..source.len(),
            });
        }
        State::InBraces { dollar, .. } => {
            return Err(ParseError::UnterminatedBrace {
                span: dollar..source.len(),
            });
        }
    }

    builder.flush_literal();
    Ok(Template::from_segments(builder.segments))
}

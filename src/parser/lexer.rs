//! Raw token lexer for template text using logos
//!
//! The lexer only splits text into the pieces the tokenizer cares about.
//! Whether an identifier run is literal text or a variable name is decided
//! later by the state machine in `grammar`.

use logos::Logos;

pub use crate::error::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    #[token("$")]
    Dollar,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,

    /// A run of `[0-9A-Za-z_]`
    #[regex(r"[0-9A-Za-z_]+")]
    Ident,

    /// Anything else, including whitespace and non-ASCII text
    #[regex(r"[^\$\{\}0-9A-Za-z_]+")]
    Text,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    // Every character belongs to some token class, so the error arm is only
    // reachable on malformed input; keep it as plain text.
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Text), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text() {
        let tokens: Vec<_> = lex("hello world").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Ident, Token::Text, Token::Ident]);
    }

    #[test]
    fn test_dollar_and_braces() {
        let tokens: Vec<_> = lex("${name}").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Dollar,
                Token::BraceOpen,
                Token::Ident,
                Token::BraceClose
            ]
        );
    }

    #[test]
    fn test_double_dollar_is_two_tokens() {
        let tokens: Vec<_> = lex("$$").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Dollar, Token::Dollar]);
    }

    #[test]
    fn test_identifier_run_stops_at_punctuation() {
        let spans: Vec<_> = lex("$env_PATH-x").collect();
        assert_eq!(
            spans,
            vec![
                (Token::Dollar, 0..1),
                (Token::Ident, 1..9),
                (Token::Text, 9..10),
                (Token::Ident, 10..11),
            ]
        );
    }

    #[test]
    fn test_unicode_is_text() {
        let tokens: Vec<_> = lex("héllo").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Ident, Token::Text, Token::Ident]);
    }
}

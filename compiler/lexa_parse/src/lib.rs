//! Lexa Parse - reference source parser.
//!
//! Turns call-expression text such as
//! `new.env(hash = TRUE, parent = x, size = y)` into `lexa_env` expression
//! trees. Only calls, names and scalar literals are supported; that is all
//! the runtime and its tests need.

mod lexer;
mod parser;

pub use lexer::{lex, Span, Token, TokenKind};

use lexa_env::{Expr, ParseFailure};

/// A lexing or parsing failure with the offending source range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

impl From<ParseError> for ParseFailure {
    fn from(err: ParseError) -> Self {
        ParseFailure::new(err.message).at(err.span.start)
    }
}

/// Parse a single expression.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex(source)?;
    parser::Parser::new(&tokens).parse_program()
}

/// [`lexa_env::Parser`] implementation over [`parse`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceParser;

impl lexa_env::Parser for SourceParser {
    fn parse(&self, source: &str) -> Result<Expr, ParseFailure> {
        Ok(parse(source)?)
    }
}

//! Lexer for call-expression source text, built on logos.
//!
//! Whitespace (including newlines) and `#` comments are skipped. Names
//! follow the usual rules: a letter or `.` first, then letters, digits,
//! `.` and `_`. Backquoted names allow anything but a backquote.

use std::fmt;

use logos::Logos;

use crate::ParseError;

/// Byte range of a token in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn point(offset: usize) -> Self {
        Span::new(offset, offset)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Raw token from logos, before unescaping.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
    #[token("TRUE")]
    True,
    #[token("FALSE")]
    False,
    #[token("NULL")]
    Null,

    #[regex(r"[A-Za-z.][A-Za-z0-9._]*")]
    Ident,
    #[regex(r"`[^`]*`")]
    QuotedIdent,

    // Trailing `L` marks an integer literal; both spellings lex the same.
    #[regex(r"[0-9]+L?", |lex| lex.slice().trim_end_matches('L').parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    String(String),
    True,
    False,
    Null,
    LParen,
    RParen,
    Comma,
    Eq,
    Eof,
}

impl TokenKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "a name",
            TokenKind::Int(_) => "an integer",
            TokenKind::String(_) => "a string",
            TokenKind::True | TokenKind::False => "a logical constant",
            TokenKind::Null => "NULL",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Comma => "`,`",
            TokenKind::Eq => "`=`",
            TokenKind::Eof => "end of input",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lex `source` into tokens, ending with `Eof`.
///
/// Stops at the first unrecognized input.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::from(logos.span());
        let slice = logos.slice();
        let Ok(raw) = result else {
            return Err(ParseError::new(format!("unexpected input `{slice}`"), span));
        };
        tokens.push(Token {
            kind: convert_token(raw, slice),
            span,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(source.len()),
    });
    Ok(tokens)
}

fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::QuotedIdent => TokenKind::Ident(strip_quotes(slice).to_string()),
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::String => TokenKind::String(unescape_string(strip_quotes(slice))),
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Eq => TokenKind::Eq,
    }
}

/// Drop the first and last character, which the regexes guarantee are
/// single-byte quotes.
fn strip_quotes(slice: &str) -> &str {
    slice.get(1..slice.len().saturating_sub(1)).unwrap_or("")
}

/// Process string escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some(c @ ('\\' | '"' | '\'' | '`')) => result.push(c),
            Some(c) => {
                // Unknown escape - keep as-is
                result.push('\\');
                result.push(c);
            }
            None => result.push('\\'),
        }
    }

    result
}

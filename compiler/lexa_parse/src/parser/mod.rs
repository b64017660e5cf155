//! Recursive descent parser producing `lexa_env` expression trees.
//!
//! Grammar:
//!
//! ```text
//! expr := primary ( "(" args? ")" )*
//! primary := name | string | int | TRUE | FALSE | NULL | "(" expr ")"
//! args := arg ( "," arg )*
//! arg := ( name | string ) "=" expr | expr
//! ```

use lexa_env::{Arg, Expr, Symbol, Value};

use crate::lexer::{Span, Token, TokenKind};
use crate::ParseError;

/// Parser state over a lexed token list ending with `Eof`.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parse exactly one expression followed by end of input.
    pub fn parse_program(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        if !self.at_end() {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> &'t TokenKind {
        self.current().map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn current_span(&self) -> Span {
        self.current().map_or_else(
            || Span::point(self.tokens.last().map_or(0, |t| t.span.end)),
            |token| token.span,
        )
    }

    fn peek_kind(&self, offset: usize) -> &'t TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn consume(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.current_kind() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            format!("expected {expected}, found {}", self.current_kind().describe()),
            self.current_span(),
        )
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while matches!(self.current_kind(), TokenKind::LParen) {
            self.advance();
            let args = self.parse_args()?;
            self.consume(&TokenKind::RParen, "`)`")?;
            expr = Expr::call(expr, args);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.current_kind() {
            TokenKind::Ident(name) => Expr::sym(name),
            TokenKind::String(text) => Expr::Literal(Value::string(text)),
            TokenKind::Int(n) => Expr::Literal(Value::int(*n)),
            TokenKind::True => Expr::Literal(Value::bool(true)),
            TokenKind::False => Expr::Literal(Value::bool(false)),
            TokenKind::Null => Expr::Literal(Value::Null),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.consume(&TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.current_kind(), TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_arg()?);
            if !matches!(self.current_kind(), TokenKind::Comma) {
                return Ok(args);
            }
            self.advance();
        }
    }

    fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        let tag = match (self.current_kind(), self.peek_kind(1)) {
            (TokenKind::Ident(name) | TokenKind::String(name), TokenKind::Eq) => Some(name),
            _ => None,
        };
        let Some(tag) = tag else {
            return Ok(Arg::positional(self.parse_expr()?));
        };
        self.advance();
        self.advance();
        Ok(Arg {
            name: Some(Symbol::new(tag)),
            value: self.parse_expr()?,
        })
    }
}

//! Boundary traits for the external collaborators.
//!
//! The runtime never evaluates or parses on its own. It delegates to an
//! `Evaluator` for every full evaluation (templates, deferred forcing,
//! active accessors, name-resolution failures) and uses a `Parser` once at
//! start-up to build its cached expressions.

use std::fmt;

use crate::env::Env;
use crate::errors::EvalResult;
use crate::expr::Expr;

/// Evaluate an expression in an environment.
pub trait Evaluator {
    fn evaluate(&self, expr: &Expr, env: &Env) -> EvalResult;

    /// Whether this evaluator's snapshot builtin already invokes active
    /// bindings and records their values.
    ///
    /// When `false`, snapshots record the accessor itself and the runtime
    /// materializes active bindings after the fact.
    fn materializes_active_bindings(&self) -> bool {
        true
    }
}

/// Turn source text into an expression tree.
pub trait Parser {
    fn parse(&self, source: &str) -> Result<Expr, ParseFailure>;
}

/// A parser's report of malformed source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    /// Byte offset of the offending token, when known.
    pub offset: Option<usize>,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        ParseFailure {
            message: message.into(),
            offset: None,
        }
    }

    #[must_use]
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at offset {offset}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ParseFailure {}

//! Expression trees handed to the evaluator.
//!
//! Trees come from the external parser. Templates keep one tree alive and
//! overwrite `Literal` argument slots in place between calls.

use crate::value::{Symbol, Value};

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// An already-evaluated value spliced into the tree.
    Literal(Value),
    /// A name to resolve in the evaluation environment.
    Sym(Symbol),
    /// A function call.
    Call(Box<Call>),
}

/// A call node: callee expression plus ordered arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub head: Expr,
    pub args: Vec<Arg>,
}

/// A call argument, positional or tagged with a parameter name.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub name: Option<Symbol>,
    pub value: Expr,
}

impl Expr {
    pub fn sym(name: &str) -> Self {
        Expr::Sym(Symbol::new(name))
    }

    pub fn call(head: Expr, args: Vec<Arg>) -> Self {
        Expr::Call(Box::new(Call { head, args }))
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Expr::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_call_mut(&mut self) -> Option<&mut Call> {
        match self {
            Expr::Call(call) => Some(call),
            _ => None,
        }
    }
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Arg { name: None, value }
    }

    pub fn named(name: &str, value: Expr) -> Self {
        Arg {
            name: Some(Symbol::new(name)),
            value,
        }
    }
}

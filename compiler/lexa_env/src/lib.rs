//! Lexa Env - lexical environment runtime.
//!
//! Environments form a parent-linked graph of frames. Each frame maps
//! names to bindings, which are realized values, deferred promises or
//! active accessors. On top of the graph this crate provides:
//!
//! - namespace lookups through a registry environment (`registry`)
//! - four cached call templates that delegate frame construction,
//!   snapshots and removal to the host evaluator (`template`)
//! - the conversion and mutation operations built from them (`ops`,
//!   exposed as methods on [`Runtime`])
//! - a thread-wide runtime with guarded free functions (`global`)
//!
//! # Boundaries
//!
//! The crate does not evaluate or parse anything itself. Hosts supply an
//! [`Evaluator`] and a [`Parser`]; the runtime only builds expressions and
//! hands them over.

mod binding;
mod env;
pub mod errors;
mod expr;
pub mod global;
mod host;
mod ops;
pub mod registry;
mod runtime;
pub mod template;
mod value;


pub use binding::{invoke_accessor, Binding, BindingKind, Promise};
pub use env::{Env, Roots, DEFAULT_ENV_SIZE};
pub use errors::{EnvError, EnvResult, EvalError, EvalErrorKind, EvalResult};
pub use expr::{Arg, Call, Expr};
pub use host::{Evaluator, ParseFailure, Parser};
pub use runtime::{Runtime, RuntimeBuilder};
pub use template::{Template, TemplateCache, TemplateGuard, TemplateKind};
pub use value::{ArgValue, Mapping, NativeFn, NativeFnBody, Symbol, Value};

//! Runtime values flowing through the environment graph.
//!
//! Values are cheap to clone: every heap payload sits behind an `Rc`.
//! Environments and functions compare by identity, everything else
//! compares structurally.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::env::Env;
use crate::errors::{wrong_arg_count, EvalResult};
use crate::host::Evaluator;

/// A binding name.
///
/// Names starting with `.` are hidden: they are skipped by name listings
/// unless all names are requested.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name is hidden from default listings.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.0.starts_with('.')
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<Rc<str>> for Symbol {
    fn from(name: Rc<str>) -> Self {
        Symbol(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}

/// A call argument after evaluation: optional name tag plus value.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgValue {
    pub name: Option<Symbol>,
    pub value: Value,
}

impl ArgValue {
    pub fn positional(value: Value) -> Self {
        ArgValue { name: None, value }
    }

    pub fn named(name: &str, value: Value) -> Self {
        ArgValue {
            name: Some(Symbol::new(name)),
            value,
        }
    }
}

/// Signature of a native function body.
///
/// The evaluator is passed through so builtins can force deferred
/// bindings and invoke other callables.
pub type NativeFnBody = dyn Fn(&dyn Evaluator, &[ArgValue]) -> EvalResult;

/// A callable implemented by the host.
#[derive(Clone)]
pub struct NativeFn {
    name: Symbol,
    body: Rc<NativeFnBody>,
}

impl NativeFn {
    pub fn new(
        name: &str,
        body: impl Fn(&dyn Evaluator, &[ArgValue]) -> EvalResult + 'static,
    ) -> Self {
        NativeFn {
            name: Symbol::new(name),
            body: Rc::new(body),
        }
    }

    /// Create a zero-argument function, the shape required of active
    /// binding accessors.
    pub fn accessor(name: &str, body: impl Fn() -> EvalResult + 'static) -> Self {
        let fn_name = name.to_string();
        NativeFn::new(name, move |_, args| {
            if args.is_empty() {
                body()
            } else {
                Err(wrong_arg_count(&fn_name, 0, args.len()))
            }
        })
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn call(&self, evaluator: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
        (self.body)(evaluator, args)
    }

    /// Identity comparison: two handles to the same function body.
    #[inline]
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

/// Ordered name to value snapshot of an environment frame.
///
/// Always hashed; iteration follows insertion order. Re-inserting an
/// existing name overwrites the value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<Symbol, Value, FxBuildHasher>,
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Mapping {
            entries: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, name: impl Into<Symbol>, value: Value) -> Option<Value> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Position of `name` in insertion order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Value)> {
        self.entries.iter()
    }
}

impl<N: Into<Symbol>> FromIterator<(N, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (name, value) in iter {
            mapping.insert(name, value);
        }
        mapping
    }
}

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// The null placeholder; also what cleared template slots hold.
    #[default]
    Null,
    Logical(Rc<[bool]>),
    Int(i64),
    Character(Rc<[Rc<str>]>),
    Env(Env),
    Mapping(Rc<Mapping>),
    Function(NativeFn),
}

impl Value {
    /// A length-one logical vector.
    pub fn bool(value: bool) -> Self {
        Value::Logical(Rc::from([value]))
    }

    pub fn int(value: i64) -> Self {
        Value::Int(value)
    }

    /// A length-one character vector.
    pub fn string(value: &str) -> Self {
        Value::Character(Rc::from([Rc::<str>::from(value)]))
    }

    pub fn strings<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        Value::Character(values.into_iter().map(Rc::<str>::from).collect())
    }

    pub fn mapping(mapping: Mapping) -> Self {
        Value::Mapping(Rc::new(mapping))
    }

    /// Name of the value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Logical(_) => "logical",
            Value::Int(_) => "integer",
            Value::Character(_) => "character",
            Value::Env(_) => "environment",
            Value::Mapping(_) => "list",
            Value::Function(_) => "function",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_env(&self) -> Option<&Env> {
        match self {
            Value::Env(env) => Some(env),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(mapping) => Some(mapping.as_ref()),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&NativeFn> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// The value of a length-one logical vector.
    pub fn as_scalar_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(values) if values.len() == 1 => values.first().copied(),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[Rc<str>]> {
        match self {
            Value::Character(values) => Some(&values[..]),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Logical(a), Value::Logical(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Env(a), Value::Env(b)) => a.ptr_eq(b),
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Logical(values) => f.debug_list().entries(values.iter()).finish(),
            Value::Int(n) => write!(f, "{n}L"),
            Value::Character(values) => f.debug_list().entries(values.iter()).finish(),
            Value::Env(env) => write!(f, "{env:?}"),
            Value::Mapping(mapping) => f.debug_map().entries(mapping.iter()).finish(),
            Value::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl From<Env> for Value {
    fn from(env: Env) -> Self {
        Value::Env(env)
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Value::mapping(mapping)
    }
}

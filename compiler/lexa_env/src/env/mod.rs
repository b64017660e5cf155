//! Environment graph: frames of bindings linked by parent pointers.
//!
//! An `Env` is a shared handle (`Rc`) to a node holding an immutable parent
//! link and a mutable frame. Parents are fixed at construction, so chains
//! are acyclic. The empty environment is the only node without a parent;
//! it is a per-thread singleton and refuses definitions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::binding::{Binding, BindingKind, Promise};
use crate::errors::{empty_env_assignment, EvalError};
use crate::expr::Expr;
use crate::host::Evaluator;
use crate::value::{NativeFn, Symbol, Value};

/// Frame capacity used when a caller passes a zero size hint.
pub const DEFAULT_ENV_SIZE: usize = 29;

thread_local! {
    static NEXT_ENV_ID: Cell<u64> = const { Cell::new(0) };
    static EMPTY_ENV: Env = Env::alloc(None, 0);
}

struct EnvNode {
    id: u64,
    parent: Option<Env>,
    frame: RefCell<IndexMap<Symbol, Binding, FxBuildHasher>>,
}

/// Handle to an environment.
///
/// Cloning the handle shares the environment; equality of environments is
/// identity (`ptr_eq`).
#[derive(Clone)]
pub struct Env(Rc<EnvNode>);

impl Env {
    fn alloc(parent: Option<Env>, size: usize) -> Env {
        let id = NEXT_ENV_ID.with(|next| {
            let id = next.get();
            next.set(id.wrapping_add(1));
            id
        });
        Env(Rc::new(EnvNode {
            id,
            parent,
            frame: RefCell::new(IndexMap::with_capacity_and_hasher(size, FxBuildHasher)),
        }))
    }

    /// The empty environment: terminal, no parent, never matches a lookup.
    pub fn empty() -> Env {
        EMPTY_ENV.with(Env::clone)
    }

    /// Create a child of `parent` with the default frame capacity.
    pub fn new(parent: &Env) -> Env {
        Env::with_capacity(parent, DEFAULT_ENV_SIZE)
    }

    /// Create a child of `parent`. A zero `size` means the default.
    pub fn with_capacity(parent: &Env, size: usize) -> Env {
        let size = if size == 0 { DEFAULT_ENV_SIZE } else { size };
        Env::alloc(Some(parent.clone()), size)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Allocation-order identifier, for diagnostics.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn is_empty_env(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The immediate parent; `None` only for the empty environment.
    #[inline]
    pub fn parent(&self) -> Option<&Env> {
        self.0.parent.as_ref()
    }

    /// Whether `ancestor` is reachable from `self` by following parents,
    /// stopping at `top`.
    ///
    /// `top` ends the walk but is still compared against `ancestor`, so an
    /// environment is its own ancestor. The empty environment has no
    /// ancestors other than itself.
    pub fn inherits(&self, ancestor: &Env, top: &Env) -> bool {
        if self.is_empty_env() {
            return ancestor.is_empty_env();
        }

        let mut cursor = self;
        while !cursor.ptr_eq(top) {
            if cursor.ptr_eq(ancestor) {
                return true;
            }
            match cursor.parent() {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        cursor.ptr_eq(ancestor)
    }

    /// The binding for `name` in this frame only.
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.0.frame.borrow().get(name).cloned()
    }

    /// Find `name` here or, with `inherits`, in the nearest ancestor that
    /// binds it. Returns the owning environment alongside the binding.
    pub fn find_binding(&self, name: &str, inherits: bool) -> Option<(Env, Binding)> {
        let mut cursor = self;
        loop {
            if let Some(binding) = cursor.binding(name) {
                return Some((cursor.clone(), binding));
            }
            if !inherits {
                return None;
            }
            cursor = cursor.parent()?;
        }
    }

    pub fn has(&self, name: &str, inherits: bool) -> bool {
        self.find_binding(name, inherits).is_some()
    }

    /// Look `name` up and resolve it to a value.
    ///
    /// The frame borrow is released before forcing or invoking, so the
    /// evaluator is free to read and write this environment.
    pub fn get(
        &self,
        name: &str,
        inherits: bool,
        evaluator: &dyn Evaluator,
    ) -> Result<Option<Value>, EvalError> {
        match self.find_binding(name, inherits) {
            Some((_, binding)) => binding.resolve(evaluator).map(Some),
            None => Ok(None),
        }
    }

    /// Bind `name` in this frame, replacing any previous binding in place.
    pub fn define_binding(&self, name: impl Into<Symbol>, binding: Binding) -> Result<(), EvalError> {
        if self.is_empty_env() {
            return Err(empty_env_assignment());
        }
        self.0.frame.borrow_mut().insert(name.into(), binding);
        Ok(())
    }

    pub fn define(&self, name: impl Into<Symbol>, value: Value) -> Result<(), EvalError> {
        self.define_binding(name, Binding::Value(value))
    }

    /// Bind `name` to `expr`, to be evaluated in `env` on first read.
    pub fn define_deferred(
        &self,
        name: impl Into<Symbol>,
        expr: Expr,
        env: &Env,
    ) -> Result<(), EvalError> {
        self.define_binding(name, Binding::Deferred(Promise::new(expr, env.clone())))
    }

    pub fn define_active(&self, name: impl Into<Symbol>, accessor: NativeFn) -> Result<(), EvalError> {
        self.define_binding(name, Binding::Active(accessor))
    }

    /// Names bound in this frame, in insertion order. Hidden names are
    /// included only when `all` is set.
    pub fn names(&self, all: bool) -> Vec<Symbol> {
        self.0
            .frame
            .borrow()
            .keys()
            .filter(|name| all || !name.is_hidden())
            .cloned()
            .collect()
    }

    /// Number of bindings in this frame.
    pub fn binding_count(&self) -> usize {
        self.0.frame.borrow().len()
    }

    /// Copy of this frame's bindings, in insertion order.
    pub fn bindings(&self) -> Vec<(Symbol, Binding)> {
        self.0
            .frame
            .borrow()
            .iter()
            .map(|(name, binding)| (name.clone(), binding.clone()))
            .collect()
    }

    pub fn binding_kinds(&self) -> Vec<(Symbol, BindingKind)> {
        self.0
            .frame
            .borrow()
            .iter()
            .map(|(name, binding)| (name.clone(), binding.kind()))
            .collect()
    }

    /// Remove `name` from this frame. Returns whether it was bound.
    pub fn unbind_local(&self, name: &str) -> bool {
        self.0.frame.borrow_mut().shift_remove(name).is_some()
    }

    /// Remove `name` from the nearest environment in the chain that binds
    /// it. Returns whether anything was removed.
    pub fn unbind_nearest(&self, name: &str) -> bool {
        match self.find_binding(name, true) {
            Some((owner, _)) => owner.unbind_local(name),
            None => false,
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_env() {
            f.write_str("<env empty>")
        } else {
            write!(f, "<env #{}>", self.0.id)
        }
    }
}

/// The distinguished root environments a runtime works against.
#[derive(Clone, Debug)]
pub struct Roots {
    base: Env,
    registry: Env,
}

impl Roots {
    /// Allocate a fresh base environment and namespace registry, both
    /// parented at the empty environment.
    pub fn new() -> Self {
        let empty = Env::empty();
        Roots {
            base: Env::new(&empty),
            registry: Env::new(&empty),
        }
    }

    pub fn empty(&self) -> Env {
        Env::empty()
    }

    /// Root of the standard bindings and the evaluation context of templates.
    pub fn base(&self) -> &Env {
        &self.base
    }

    /// Holds one binding per loaded package, naming its namespace.
    pub fn registry(&self) -> &Env {
        &self.registry
    }
}

impl Default for Roots {
    fn default() -> Self {
        Self::new()
    }
}

//! Binding kinds stored in an environment frame.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::env::Env;
use crate::errors::{recursive_promise, EvalResult};
use crate::expr::Expr;
use crate::host::Evaluator;
use crate::value::{NativeFn, Value};

/// What a name is bound to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A realized value.
    Value(Value),
    /// An unevaluated expression, realized on first read and cached.
    Deferred(Promise),
    /// A zero-argument accessor invoked on every read, never cached.
    Active(NativeFn),
}

/// Discriminant of a `Binding`, for introspection and snapshot fix-ups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Value,
    Deferred { forced: bool },
    Active,
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Value(_) => BindingKind::Value,
            Binding::Deferred(promise) => BindingKind::Deferred {
                forced: promise.is_forced(),
            },
            Binding::Active(_) => BindingKind::Active,
        }
    }

    /// Produce the binding's value: force a deferred binding, invoke an
    /// active one.
    pub fn resolve(&self, evaluator: &dyn Evaluator) -> EvalResult {
        match self {
            Binding::Value(value) => Ok(value.clone()),
            Binding::Deferred(promise) => promise.force(evaluator),
            Binding::Active(accessor) => invoke_accessor(evaluator, accessor),
        }
    }
}

/// Call an active binding's accessor with no arguments in the empty
/// environment.
pub fn invoke_accessor(evaluator: &dyn Evaluator, accessor: &NativeFn) -> EvalResult {
    let call = Expr::call(Expr::Literal(Value::Function(accessor.clone())), Vec::new());
    evaluator.evaluate(&call, &Env::empty())
}

enum PromiseState {
    Pending { expr: Expr, env: Env },
    Forcing,
    Forced(Value),
}

/// A deferred computation shared by every frame that binds it.
///
/// Once forced, the promise drops its expression and environment so they
/// can be released.
#[derive(Clone)]
pub struct Promise(Rc<RefCell<PromiseState>>);

impl Promise {
    pub fn new(expr: Expr, env: Env) -> Self {
        Promise(Rc::new(RefCell::new(PromiseState::Pending { expr, env })))
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.0.borrow(), PromiseState::Forced(_))
    }

    /// The cached value, if already forced.
    pub fn value(&self) -> Option<Value> {
        match &*self.0.borrow() {
            PromiseState::Forced(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Evaluate the expression once and cache the result.
    ///
    /// Reading the promise while it is being forced fails instead of
    /// recursing. A failed or panicking evaluation leaves the promise
    /// pending.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn force(&self, evaluator: &dyn Evaluator) -> EvalResult {
        let state = mem::replace(&mut *self.0.borrow_mut(), PromiseState::Forcing);
        let (expr, env) = match state {
            PromiseState::Forced(value) => {
                *self.0.borrow_mut() = PromiseState::Forced(value.clone());
                return Ok(value);
            }
            PromiseState::Forcing => return Err(recursive_promise()),
            PromiseState::Pending { expr, env } => (expr, env),
        };

        let guard = ForcingGuard {
            state: &self.0,
            expr,
            env,
        };
        let value = evaluator.evaluate(&guard.expr, &guard.env)?;
        *self.0.borrow_mut() = PromiseState::Forced(value.clone());
        Ok(value)
    }
}

/// Holds a promise's expression while it is forced and puts it back
/// unless the promise reached `Forced`.
struct ForcingGuard<'p> {
    state: &'p RefCell<PromiseState>,
    expr: Expr,
    env: Env,
}

impl Drop for ForcingGuard<'_> {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        if matches!(*state, PromiseState::Forcing) {
            *state = PromiseState::Pending {
                expr: mem::replace(&mut self.expr, Expr::Literal(Value::Null)),
                env: mem::replace(&mut self.env, Env::empty()),
            };
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.borrow() {
            PromiseState::Pending { expr, .. } => write!(f, "<promise {expr:?}>"),
            PromiseState::Forcing => f.write_str("<promise (forcing)>"),
            PromiseState::Forced(value) => write!(f, "<promise = {value:?}>"),
        }
    }
}

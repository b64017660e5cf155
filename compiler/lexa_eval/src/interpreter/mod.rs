//! Tree-walking evaluator for `lexa_env` expression trees.
//!
//! Literals evaluate to themselves, names resolve through the
//! environment chain (forcing promises and invoking active bindings), and
//! calls evaluate the head, then every argument left to right, then apply
//! the resulting native function.

use std::cell::Cell;

use lexa_env::errors::{not_callable, undefined_variable};
use lexa_env::{ArgValue, Call, Env, EvalError, EvalResult, Evaluator, Expr, Value};

use crate::stack::ensure_sufficient_stack;
use crate::HostConfig;

/// The reference host's evaluator.
#[derive(Debug)]
pub struct Interpreter {
    config: HostConfig,
    /// Number of calls applied so far.
    calls: Cell<u64>,
}

impl Interpreter {
    pub fn new(config: HostConfig) -> Self {
        Interpreter {
            config,
            calls: Cell::new(0),
        }
    }

    pub fn config(&self) -> HostConfig {
        self.config
    }

    pub fn calls(&self) -> u64 {
        self.calls.get()
    }

    fn eval_call(&self, call: &Call, env: &Env) -> EvalResult {
        let head = self.evaluate(&call.head, env)?;
        let Value::Function(func) = head else {
            return Err(not_callable(head.type_name()));
        };

        let args = call
            .args
            .iter()
            .map(|arg| {
                Ok(ArgValue {
                    name: arg.name.clone(),
                    value: self.evaluate(&arg.value, env)?,
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        self.calls.set(self.calls.get().wrapping_add(1));
        tracing::trace!(function = %func.name(), args = args.len(), "apply");
        func.call(self, &args)
    }
}

impl Evaluator for Interpreter {
    fn evaluate(&self, expr: &Expr, env: &Env) -> EvalResult {
        ensure_sufficient_stack(|| match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Sym(name) => env
                .get(name.as_str(), true, self)?
                .ok_or_else(|| undefined_variable(name.as_str())),
            Expr::Call(call) => self.eval_call(call, env),
        })
    }

    fn materializes_active_bindings(&self) -> bool {
        self.config.materialize_active_in_snapshot
    }
}

//! Cached expression skeletons for the structural operations.
//!
//! Each template is parsed once, kept for the runtime's lifetime, and
//! reused by overwriting its argument slots in place. Use follows a strict
//! acquire, populate, evaluate, clear protocol:
//!
//! ```text
//! let mut guard = template.acquire()?;   // fails if already in use
//! guard.poke(0, env_value);
//! let out = guard.eval(evaluator, base);
//! drop(guard);                           // slots reset to NULL, even on error or panic
//! ```
//!
//! Clearing matters: a slot left populated keeps the caller's argument
//! reachable after the call returns.

use std::cell::{Cell, RefCell};
use std::fmt;

use smallvec::SmallVec;

use crate::env::Env;
use crate::errors::{EnvError, EnvResult, EvalResult};
use crate::expr::{Call, Expr};
use crate::host::{Evaluator, Parser};
use crate::value::Value;

/// The structural operation a template performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// `(parent, size)` to a new environment.
    NewEnv,
    /// `(env)` to an ordered mapping of its whole frame.
    EnvToMapping,
    /// `(mapping, parent)` to a new hashed environment.
    MappingToEnv,
    /// `(env, names, inherits)` removing bindings.
    RemoveNames,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::NewEnv,
        TemplateKind::EnvToMapping,
        TemplateKind::MappingToEnv,
        TemplateKind::RemoveNames,
    ];

    pub fn source(self) -> &'static str {
        match self {
            TemplateKind::NewEnv => "new.env(hash = TRUE, parent = x, size = y)",
            TemplateKind::EnvToMapping => "as.list.environment(x, all.names = TRUE)",
            TemplateKind::MappingToEnv => "list2env(x, envir = NULL, parent = y, hash = TRUE)",
            TemplateKind::RemoveNames => "remove(list = y, envir = x, inherits = z)",
        }
    }

    /// Slot symbols in argument order of `Template::invoke`.
    pub fn slot_names(self) -> &'static [&'static str] {
        match self {
            TemplateKind::EnvToMapping => &["x"],
            TemplateKind::NewEnv | TemplateKind::MappingToEnv => &["x", "y"],
            TemplateKind::RemoveNames => &["x", "y", "z"],
        }
    }

    /// Whether the callee is resolved once at compile time and spliced in
    /// as a literal function value.
    fn inlines_head(self) -> bool {
        matches!(self, TemplateKind::NewEnv)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemplateKind::NewEnv => "new-env",
            TemplateKind::EnvToMapping => "env-to-mapping",
            TemplateKind::MappingToEnv => "mapping-to-env",
            TemplateKind::RemoveNames => "remove-names",
        };
        f.write_str(name)
    }
}

/// A parsed call skeleton with mutable argument slots.
pub struct Template {
    kind: TemplateKind,
    skeleton: RefCell<Expr>,
    /// Argument index of each slot, in `slot_names` order.
    slots: SmallVec<[usize; 3]>,
    in_use: Cell<bool>,
}

impl Template {
    /// Parse `kind`'s source and locate its slots.
    ///
    /// Slot arguments start out as `NULL` literals. For kinds that inline
    /// their callee, the head is evaluated once in `base`.
    pub fn compile(
        kind: TemplateKind,
        parser: &dyn Parser,
        evaluator: &dyn Evaluator,
        base: &Env,
    ) -> EnvResult<Self> {
        let mut skeleton = parser.parse(kind.source()).map_err(|err| EnvError::Parse {
            text: kind.source().to_string(),
            message: err.to_string(),
        })?;
        let call = skeleton
            .as_call_mut()
            .ok_or_else(|| EnvError::internal(format!("template `{kind}` is not a call")))?;

        if kind.inlines_head() {
            let head = evaluator.evaluate(&call.head, base)?;
            call.head = Expr::Literal(head);
        }

        let mut slots = SmallVec::new();
        for &slot in kind.slot_names() {
            let index = slot_position(call, slot).ok_or_else(|| {
                EnvError::internal(format!("template `{kind}` has no `{slot}` slot"))
            })?;
            call.args[index].value = Expr::Literal(Value::Null);
            slots.push(index);
        }

        tracing::trace!(template = %kind, slots = slots.len(), "compiled template");
        Ok(Template {
            kind,
            skeleton: RefCell::new(skeleton),
            slots,
            in_use: Cell::new(false),
        })
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.get()
    }

    /// Current contents of every slot, in slot order.
    pub fn slot_values(&self) -> Vec<Value> {
        let skeleton = self.skeleton.borrow();
        let Some(call) = skeleton.as_call() else {
            return Vec::new();
        };
        self.slots
            .iter()
            .map(|&index| match call.args.get(index).map(|arg| &arg.value) {
                Some(Expr::Literal(value)) => value.clone(),
                _ => Value::Null,
            })
            .collect()
    }

    /// Whether every slot holds the `NULL` placeholder.
    pub fn slots_are_clear(&self) -> bool {
        self.slot_values().iter().all(Value::is_null)
    }

    /// Take exclusive use of the template.
    ///
    /// Fails if another call still holds it, which means the evaluator
    /// re-entered this template while its slots were live.
    pub fn acquire(&self) -> EnvResult<TemplateGuard<'_>> {
        if self.in_use.replace(true) {
            return Err(EnvError::internal(format!(
                "template `{}` re-entered while in use",
                self.kind
            )));
        }
        Ok(TemplateGuard { template: self })
    }

    /// Run the template with one value per slot, evaluated in `env`.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %self.kind))]
    pub fn invoke(
        &self,
        evaluator: &dyn Evaluator,
        env: &Env,
        args: Vec<Value>,
    ) -> EnvResult<Value> {
        if args.len() != self.slots.len() {
            return Err(EnvError::internal(format!(
                "template `{}` takes {} arguments, got {}",
                self.kind,
                self.slots.len(),
                args.len()
            )));
        }

        let guard = self.acquire()?;
        for (slot, value) in args.into_iter().enumerate() {
            guard.poke(slot, value);
        }
        Ok(guard.eval(evaluator, env)?)
    }

    fn write_slot(&self, slot: usize, value: Value) {
        let Some(&index) = self.slots.get(slot) else {
            return;
        };
        let mut skeleton = self.skeleton.borrow_mut();
        if let Some(arg) = skeleton
            .as_call_mut()
            .and_then(|call| call.args.get_mut(index))
        {
            arg.value = Expr::Literal(value);
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("kind", &self.kind)
            .field("slots", &self.slots)
            .field("in_use", &self.in_use.get())
            .finish_non_exhaustive()
    }
}

fn slot_position(call: &Call, slot: &str) -> Option<usize> {
    call.args
        .iter()
        .position(|arg| matches!(&arg.value, Expr::Sym(name) if name.as_str() == slot))
}

/// Exclusive use of a template. Dropping the guard clears every slot
/// and releases the template.
pub struct TemplateGuard<'t> {
    template: &'t Template,
}

impl TemplateGuard<'_> {
    /// Write `value` into slot number `slot`.
    pub fn poke(&self, slot: usize, value: Value) {
        self.template.write_slot(slot, value);
    }

    pub fn eval(&self, evaluator: &dyn Evaluator, env: &Env) -> EvalResult {
        let skeleton = self.template.skeleton.borrow();
        evaluator.evaluate(&skeleton, env)
    }
}

impl Drop for TemplateGuard<'_> {
    fn drop(&mut self) {
        for slot in 0..self.template.slots.len() {
            self.template.write_slot(slot, Value::Null);
        }
        self.template.in_use.set(false);
    }
}

/// The runtime's four templates.
#[derive(Debug)]
pub struct TemplateCache {
    new_env: Template,
    env_to_mapping: Template,
    mapping_to_env: Template,
    remove_names: Template,
}

impl TemplateCache {
    pub fn compile(parser: &dyn Parser, evaluator: &dyn Evaluator, base: &Env) -> EnvResult<Self> {
        Ok(TemplateCache {
            new_env: Template::compile(TemplateKind::NewEnv, parser, evaluator, base)?,
            env_to_mapping: Template::compile(TemplateKind::EnvToMapping, parser, evaluator, base)?,
            mapping_to_env: Template::compile(TemplateKind::MappingToEnv, parser, evaluator, base)?,
            remove_names: Template::compile(TemplateKind::RemoveNames, parser, evaluator, base)?,
        })
    }

    pub fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::NewEnv => &self.new_env,
            TemplateKind::EnvToMapping => &self.env_to_mapping,
            TemplateKind::MappingToEnv => &self.mapping_to_env,
            TemplateKind::RemoveNames => &self.remove_names,
        }
    }

    pub fn all_clear(&self) -> bool {
        TemplateKind::ALL
            .into_iter()
            .all(|kind| self.get(kind).slots_are_clear() && !self.get(kind).is_in_use())
    }
}

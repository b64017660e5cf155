//! Conversion and mutation operations on environments.
//!
//! Every operation that builds or edits frames delegates to a template, so
//! the evaluator's own builtins do the work. Dynamic entry points
//! (`is_ancestor`, `unbind`) take untyped values and validate them first.

use crate::binding::{invoke_accessor, BindingKind};
use crate::env::Env;
use crate::errors::{EnvError, EnvResult};
use crate::runtime::Runtime;
use crate::template::TemplateKind;
use crate::value::{Mapping, Symbol, Value};

fn expect_env<'v>(value: &'v Value, param: &'static str) -> EnvResult<&'v Env> {
    value
        .as_env()
        .ok_or_else(|| EnvError::type_mismatch(param, "an environment"))
}

fn unexpected_output(kind: TemplateKind, value: &Value) -> EnvError {
    EnvError::internal(format!(
        "template `{kind}` returned a {} value",
        value.type_name()
    ))
}

impl Runtime {
    /// Ancestry test on untyped arguments. `top` defaults to the empty
    /// environment.
    pub fn is_ancestor(&self, env: &Value, ancestor: &Value, top: Option<&Value>) -> EnvResult<bool> {
        let env = expect_env(env, "env")?;
        let ancestor = expect_env(ancestor, "ancestor")?;
        let top = match top {
            Some(top) => expect_env(top, "top")?.clone(),
            None => Env::empty(),
        };
        Ok(env.inherits(ancestor, &top))
    }

    /// A new environment built by the evaluator. `parent` defaults to the
    /// empty environment; a zero `size` means the configured default.
    pub fn new_environment(&self, parent: Option<&Env>, size: usize) -> EnvResult<Env> {
        let parent = parent.cloned().unwrap_or_else(Env::empty);
        let size = if size == 0 { self.default_env_size() } else { size };
        let size = i64::try_from(size)
            .map_err(|_| EnvError::type_mismatch("size", "a representable integer"))?;

        let kind = TemplateKind::NewEnv;
        let out = self.templates().get(kind).invoke(
            self.evaluator(),
            self.base_env(),
            vec![Value::Env(parent), Value::int(size)],
        )?;
        match out {
            Value::Env(env) => Ok(env),
            other => Err(unexpected_output(kind, &other)),
        }
    }

    /// Ordered snapshot of `env`'s whole frame, hidden names included.
    ///
    /// Active bindings hold their current value, not the accessor. When
    /// the evaluator records accessors, they are invoked here, after the
    /// snapshot template has been released.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn to_mapping(&self, env: &Env) -> EnvResult<Mapping> {
        let kind = TemplateKind::EnvToMapping;
        let out = self.templates().get(kind).invoke(
            self.evaluator(),
            self.base_env(),
            vec![Value::Env(env.clone())],
        )?;
        let mapping = match out {
            Value::Mapping(mapping) => std::rc::Rc::unwrap_or_clone(mapping),
            other => return Err(unexpected_output(kind, &other)),
        };

        if self.needs_active_binding_materialization() {
            self.materialize_active_bindings(env, mapping)
        } else {
            Ok(mapping)
        }
    }

    /// Invoke the accessors recorded in `mapping` for every name that was
    /// active at snapshot time. The recorded function is used rather than
    /// the live binding, since an earlier accessor may have rebound it.
    fn materialize_active_bindings(&self, env: &Env, mut mapping: Mapping) -> EnvResult<Mapping> {
        for (name, kind) in env.binding_kinds() {
            if kind != BindingKind::Active {
                continue;
            }
            let Some(recorded) = mapping.get(name.as_str()) else {
                return Err(EnvError::internal(format!(
                    "can't find active binding `{name}` in snapshot"
                )));
            };
            let Some(accessor) = recorded.as_function().cloned() else {
                continue;
            };

            tracing::trace!(%name, "materializing active binding");
            let value = invoke_accessor(self.evaluator(), &accessor)?;
            mapping.insert(name, value);
        }
        Ok(mapping)
    }

    /// A new hashed environment populated from `mapping`. `parent`
    /// defaults to the empty environment.
    #[tracing::instrument(level = "debug", skip_all, fields(len = mapping.len()))]
    pub fn from_mapping(&self, mapping: &Mapping, parent: Option<&Env>) -> EnvResult<Env> {
        let parent = parent.cloned().unwrap_or_else(Env::empty);
        let kind = TemplateKind::MappingToEnv;
        let out = self.templates().get(kind).invoke(
            self.evaluator(),
            self.base_env(),
            vec![Value::mapping(mapping.clone()), Value::Env(parent)],
        )?;
        match out {
            Value::Env(env) => Ok(env),
            other => Err(unexpected_output(kind, &other)),
        }
    }

    /// Shallow copy of `env`'s frame into a new environment.
    ///
    /// The copy is parented at `parent`, or at `env`'s own parent. Values
    /// are shared; only frame membership is duplicated.
    pub fn clone_env(&self, env: &Env, parent: Option<&Env>) -> EnvResult<Env> {
        let parent = match parent {
            Some(parent) => parent.clone(),
            None => env
                .parent()
                .cloned()
                .ok_or_else(|| EnvError::type_mismatch("env", "a non-empty environment"))?,
        };
        let mapping = self.to_mapping(env)?;
        self.from_mapping(&mapping, Some(&parent))
    }

    /// Remove `names` from `env` on untyped arguments.
    ///
    /// `names` must be a character vector and `inherits` a single logical.
    pub fn unbind(&self, env: &Value, names: &Value, inherits: &Value) -> EnvResult<()> {
        let env = expect_env(env, "env")?;
        if names.as_strings().is_none() {
            return Err(EnvError::type_mismatch("names", "a character vector"));
        }
        let inherits = inherits
            .as_scalar_bool()
            .ok_or_else(|| EnvError::type_mismatch("inherits", "a scalar logical vector"))?;
        self.remove_names(env, names.clone(), inherits)
    }

    #[tracing::instrument(level = "debug", skip(self, env, names))]
    fn remove_names(&self, env: &Env, names: Value, inherits: bool) -> EnvResult<()> {
        self.templates().get(TemplateKind::RemoveNames).invoke(
            self.evaluator(),
            self.base_env(),
            vec![Value::Env(env.clone()), names, Value::bool(inherits)],
        )?;
        Ok(())
    }

    /// Remove `names` from `env`'s own frame.
    pub fn unbind_names(&self, env: &Env, names: &[Symbol]) -> EnvResult<()> {
        self.remove_names(env, names_value(names), false)
    }

    /// Remove each of `names` from the nearest environment binding it.
    pub fn unbind_anywhere_names(&self, env: &Env, names: &[Symbol]) -> EnvResult<()> {
        self.remove_names(env, names_value(names), true)
    }

    pub fn unbind_strings(&self, env: &Env, names: &[&str]) -> EnvResult<()> {
        self.remove_names(env, Value::strings(names.iter().copied()), false)
    }

    pub fn unbind_anywhere_strings(&self, env: &Env, names: &[&str]) -> EnvResult<()> {
        self.remove_names(env, Value::strings(names.iter().copied()), true)
    }

    pub fn unbind_string(&self, env: &Env, name: &str) -> EnvResult<()> {
        self.unbind_strings(env, &[name])
    }

    pub fn unbind_string_anywhere(&self, env: &Env, name: &str) -> EnvResult<()> {
        self.unbind_anywhere_strings(env, &[name])
    }
}

fn names_value(names: &[Symbol]) -> Value {
    Value::strings(names.iter().map(Symbol::as_str))
}

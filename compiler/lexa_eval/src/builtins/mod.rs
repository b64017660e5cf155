//! Builtin functions of the reference host's base environment.
//!
//! These are the functions the runtime's templates call, plus a handful
//! of constructors (`list`, `c`) that make host programs and tests
//! readable. Arguments are matched by exact name first, then positionally
//! in declaration order.

use std::rc::Rc;

use lexa_env::errors::{
    missing_argument, type_mismatch, undefined_namespace, unused_argument, wrong_arg_count,
};
use lexa_env::{
    ArgValue, Binding, Env, EvalError, EvalResult, Evaluator, Mapping, NativeFn, Roots, Value,
    DEFAULT_ENV_SIZE,
};

/// Arguments matched against a builtin's parameter list.
struct Matched<'a> {
    function: &'static str,
    params: &'static [&'static str],
    slots: Vec<Option<&'a Value>>,
}

impl<'a> Matched<'a> {
    fn new(
        function: &'static str,
        params: &'static [&'static str],
        args: &'a [ArgValue],
    ) -> Result<Self, EvalError> {
        let mut slots: Vec<Option<&Value>> = vec![None; params.len()];
        let mut positional = Vec::new();

        for arg in args {
            let Some(name) = &arg.name else {
                positional.push(&arg.value);
                continue;
            };
            match params.iter().position(|param| *param == name.as_str()) {
                Some(index) if slots[index].is_none() => slots[index] = Some(&arg.value),
                _ => return Err(unused_argument(function, name.as_str())),
            }
        }

        let mut free = slots
            .iter_mut()
            .filter(|slot| slot.is_none())
            .collect::<Vec<_>>()
            .into_iter();
        for value in positional {
            let Some(slot) = free.next() else {
                return Err(wrong_arg_count(function, params.len(), args.len()));
            };
            *slot = Some(value);
        }

        Ok(Matched {
            function,
            params,
            slots,
        })
    }

    fn get(&self, param: &str) -> Option<&'a Value> {
        self.params
            .iter()
            .position(|p| *p == param)
            .and_then(|index| self.slots[index])
    }

    fn required(&self, param: &str) -> Result<&'a Value, EvalError> {
        self.get(param)
            .ok_or_else(|| missing_argument(self.function, param))
    }

    fn env(&self, param: &str) -> Result<Env, EvalError> {
        let value = self.required(param)?;
        value
            .as_env()
            .cloned()
            .ok_or_else(|| type_mismatch("environment", value.type_name()))
    }

    fn flag(&self, param: &str, default: bool) -> Result<bool, EvalError> {
        match self.get(param) {
            None => Ok(default),
            Some(value) => value
                .as_scalar_bool()
                .ok_or_else(|| type_mismatch("a single logical", value.type_name())),
        }
    }

    fn names(&self, param: &str) -> Result<Vec<Rc<str>>, EvalError> {
        match self.get(param) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => value
                .as_strings()
                .map(<[Rc<str>]>::to_vec)
                .ok_or_else(|| type_mismatch("character", value.type_name())),
        }
    }
}

fn define_builtin(
    base: &Env,
    name: &str,
    body: impl Fn(&dyn Evaluator, &[ArgValue]) -> EvalResult + 'static,
) -> Result<(), EvalError> {
    base.define(name, Value::Function(NativeFn::new(name, body)))
}

/// Install every builtin into `roots`' base environment.
pub fn install(roots: &Roots) -> Result<(), EvalError> {
    let base = roots.base();

    define_builtin(base, "new.env", new_env)?;
    define_builtin(base, "as.list.environment", as_list_environment)?;
    define_builtin(base, "list2env", list2env)?;
    define_builtin(base, "remove", remove)?;
    define_builtin(base, "list", list)?;
    define_builtin(base, "c", concat)?;
    define_builtin(base, "identity", |_, args| {
        let args = Matched::new("identity", &["x"], args)?;
        Ok(args.required("x")?.clone())
    })?;
    define_builtin(base, "emptyenv", |_, args| {
        Matched::new("emptyenv", &[], args)?;
        Ok(Value::Env(Env::empty()))
    })?;
    define_builtin(base, "stop", |_, args| {
        let args = Matched::new("stop", &["message"], args)?;
        let message = match args.get("message").and_then(Value::as_strings) {
            Some([message, ..]) => message.to_string(),
            _ => "error".to_string(),
        };
        Err(EvalError::new(message))
    })?;

    let registry = roots.registry().clone();
    define_builtin(base, "asNamespace", move |ev, args| {
        as_namespace(&registry, ev, args)
    })?;

    tracing::debug!(bindings = base.binding_count(), "builtins installed");
    Ok(())
}

fn new_env(_: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let args = Matched::new("new.env", &["hash", "parent", "size"], args)?;
    args.flag("hash", true)?;
    let parent = match args.get("parent") {
        Some(_) => args.env("parent")?,
        None => Env::empty(),
    };
    let size = match args.get("size") {
        None => DEFAULT_ENV_SIZE,
        Some(Value::Int(size)) => usize::try_from(*size)
            .map_err(|_| type_mismatch("a non-negative size", "a negative integer"))?,
        Some(other) => return Err(type_mismatch("integer", other.type_name())),
    };
    Ok(Value::Env(Env::with_capacity(&parent, size)))
}

/// Snapshot of a frame. Hosts that do not materialize active bindings
/// record the accessor function itself.
fn as_list_environment(ev: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let args = Matched::new("as.list.environment", &["x", "all.names"], args)?;
    let env = args.env("x")?;
    let all = args.flag("all.names", false)?;

    let bindings = env.bindings();
    let mut mapping = Mapping::with_capacity(bindings.len());
    for (name, binding) in bindings {
        if !all && name.is_hidden() {
            continue;
        }
        let value = match binding {
            Binding::Active(accessor) if !ev.materializes_active_bindings() => {
                Value::Function(accessor)
            }
            binding => binding.resolve(ev)?,
        };
        mapping.insert(name, value);
    }
    Ok(Value::mapping(mapping))
}

fn list2env(_: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let args = Matched::new("list2env", &["x", "envir", "parent", "hash", "size"], args)?;
    let mapping = match args.required("x")? {
        Value::Mapping(mapping) => Rc::clone(mapping),
        Value::Null => Rc::new(Mapping::new()),
        other => return Err(type_mismatch("list", other.type_name())),
    };
    args.flag("hash", true)?;

    let env = match args.get("envir") {
        Some(Value::Null) | None => {
            let parent = match args.get("parent") {
                Some(_) => args.env("parent")?,
                None => Env::empty(),
            };
            let size = mapping.len().max(DEFAULT_ENV_SIZE);
            Env::with_capacity(&parent, size)
        }
        Some(_) => args.env("envir")?,
    };
    for (name, value) in mapping.iter() {
        env.define(name.clone(), value.clone())?;
    }
    Ok(Value::Env(env))
}

/// Absent names are ignored. With `inherits`, each name is removed from
/// the nearest environment that binds it.
fn remove(_: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let args = Matched::new("remove", &["list", "envir", "inherits"], args)?;
    let names = args.names("list")?;
    let env = args.env("envir")?;
    let inherits = args.flag("inherits", false)?;

    for name in &names {
        let removed = if inherits {
            env.unbind_nearest(name)
        } else {
            env.unbind_local(name)
        };
        if !removed {
            tracing::debug!(%name, "remove: no such binding");
        }
    }
    Ok(Value::Null)
}

/// Registry lookup, forcing a lazily loaded namespace.
fn as_namespace(registry: &Env, ev: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let args = Matched::new("asNamespace", &["ns"], args)?;
    let package = match args.required("ns")? {
        Value::Env(ns) => return Ok(Value::Env(ns.clone())),
        value => match value.as_strings() {
            Some([package]) => Rc::clone(package),
            _ => return Err(type_mismatch("a package name", value.type_name())),
        },
    };
    registry
        .get(&package, false, ev)?
        .ok_or_else(|| undefined_namespace(&package))
}

/// `list(a = 1, b = 2)`. Every element needs a name.
fn list(_: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let mut mapping = Mapping::with_capacity(args.len());
    for arg in args {
        let Some(name) = &arg.name else {
            return Err(EvalError::new("list() elements must be named"));
        };
        mapping.insert(name.clone(), arg.value.clone());
    }
    Ok(Value::mapping(mapping))
}

/// Concatenate character vectors, skipping `NULL`s.
fn concat(_: &dyn Evaluator, args: &[ArgValue]) -> EvalResult {
    let mut out: Vec<Rc<str>> = Vec::new();
    for arg in args {
        if let Some(name) = &arg.name {
            return Err(unused_argument("c", name.as_str()));
        }
        match &arg.value {
            Value::Null => {}
            Value::Character(values) => out.extend(values.iter().cloned()),
            other => return Err(type_mismatch("character", other.type_name())),
        }
    }
    Ok(Value::Character(out.into()))
}

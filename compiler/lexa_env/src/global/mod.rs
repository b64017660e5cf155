//! Thread-wide runtime and guarded entry points.
//!
//! Hosts call [`init`] once at start-up; the free functions here then
//! forward to that runtime. Before `init` every entry point fails with
//! [`EnvError::NotInitialized`].

use std::cell::OnceCell;
use std::rc::Rc;

use crate::env::Env;
use crate::errors::{EnvError, EnvResult};
use crate::runtime::Runtime;
use crate::value::{Mapping, Symbol, Value};

thread_local! {
    static RUNTIME: OnceCell<Rc<Runtime>> = const { OnceCell::new() };
}

/// Install `runtime` for this thread. A second call fails and leaves the
/// first runtime in place.
pub fn init(runtime: Runtime) -> EnvResult<()> {
    RUNTIME.with(|cell| {
        cell.set(Rc::new(runtime))
            .map_err(|_| EnvError::AlreadyInitialized)
    })?;
    tracing::debug!("environment runtime installed");
    Ok(())
}

pub fn is_initialized() -> bool {
    RUNTIME.with(|cell| cell.get().is_some())
}

/// The installed runtime.
pub fn runtime() -> EnvResult<Rc<Runtime>> {
    RUNTIME.with(|cell| cell.get().cloned().ok_or(EnvError::NotInitialized))
}

/// Run `f` against the installed runtime.
///
/// The runtime is cloned out of the thread-local first, so `f` may itself
/// call back into these entry points.
pub fn with_runtime<T>(f: impl FnOnce(&Runtime) -> EnvResult<T>) -> EnvResult<T> {
    let runtime = runtime()?;
    f(&runtime)
}

pub fn namespace(package: &str) -> EnvResult<Env> {
    with_runtime(|rt| rt.namespace(package))
}

pub fn ns_get(ns: &Env, name: &str) -> EnvResult<Value> {
    with_runtime(|rt| rt.ns_get(ns, name))
}

pub fn base_get(name: &str) -> EnvResult<Value> {
    with_runtime(|rt| rt.base_get(name))
}

pub fn own_namespace_get(name: &str) -> EnvResult<Value> {
    with_runtime(|rt| rt.own_namespace_get(name))
}

pub fn is_ancestor(env: &Value, ancestor: &Value, top: Option<&Value>) -> EnvResult<bool> {
    with_runtime(|rt| rt.is_ancestor(env, ancestor, top))
}

pub fn new_environment(parent: Option<&Env>, size: usize) -> EnvResult<Env> {
    with_runtime(|rt| rt.new_environment(parent, size))
}

pub fn to_mapping(env: &Env) -> EnvResult<Mapping> {
    with_runtime(|rt| rt.to_mapping(env))
}

pub fn from_mapping(mapping: &Mapping, parent: Option<&Env>) -> EnvResult<Env> {
    with_runtime(|rt| rt.from_mapping(mapping, parent))
}

pub fn clone_env(env: &Env, parent: Option<&Env>) -> EnvResult<Env> {
    with_runtime(|rt| rt.clone_env(env, parent))
}

pub fn unbind(env: &Value, names: &Value, inherits: &Value) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind(env, names, inherits))
}

pub fn unbind_names(env: &Env, names: &[Symbol]) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_names(env, names))
}

pub fn unbind_anywhere_names(env: &Env, names: &[Symbol]) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_anywhere_names(env, names))
}

pub fn unbind_strings(env: &Env, names: &[&str]) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_strings(env, names))
}

pub fn unbind_anywhere_strings(env: &Env, names: &[&str]) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_anywhere_strings(env, names))
}

pub fn unbind_string(env: &Env, name: &str) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_string(env, name))
}

pub fn unbind_string_anywhere(env: &Env, name: &str) -> EnvResult<()> {
    with_runtime(|rt| rt.unbind_string_anywhere(env, name))
}

//! The runtime handle: roots, evaluator, templates and resolved settings.
//!
//! A `Runtime` is built once through [`RuntimeBuilder`] and then serves
//! every operation. The structural operations themselves live in
//! `crate::ops`.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::env::{Env, Roots};
use crate::errors::{EnvError, EnvResult};
use crate::host::Evaluator;
use crate::registry;
use crate::template::TemplateCache;
use crate::value::{Symbol, Value};

mod builder;

pub use builder::RuntimeBuilder;

/// Everything the environment operations need, resolved at start-up.
pub struct Runtime {
    roots: Roots,
    evaluator: Rc<dyn Evaluator>,
    templates: TemplateCache,
    needs_active_binding_materialization: bool,
    default_env_size: usize,
    own_namespace: Option<Env>,
    bootstrapped: FxHashMap<Symbol, Env>,
}

impl Runtime {
    pub fn builder(roots: Roots, evaluator: Rc<dyn Evaluator>) -> RuntimeBuilder {
        RuntimeBuilder::new(roots, evaluator)
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn base_env(&self) -> &Env {
        self.roots.base()
    }

    pub fn registry_env(&self) -> &Env {
        self.roots.registry()
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        &*self.evaluator
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// Whether snapshots need active bindings invoked after the fact.
    /// Fixed when the runtime is built.
    pub fn needs_active_binding_materialization(&self) -> bool {
        self.needs_active_binding_materialization
    }

    /// Size hint used by `new_environment` when the caller passes zero.
    pub fn default_env_size(&self) -> usize {
        self.default_env_size
    }

    /// The namespace environment registered for `package`.
    pub fn namespace(&self, package: &str) -> EnvResult<Env> {
        registry::namespace(self.registry_env(), package, self.evaluator())
    }

    /// A binding of namespace `ns`, forced if deferred.
    pub fn ns_get(&self, ns: &Env, name: &str) -> EnvResult<Value> {
        registry::ns_env_get(ns, name, self.evaluator())
    }

    /// A binding of the base environment.
    pub fn base_get(&self, name: &str) -> EnvResult<Value> {
        registry::ns_env_get(self.base_env(), name, self.evaluator())
    }

    /// The runtime's own namespace, if one was configured.
    pub fn own_namespace(&self) -> Option<&Env> {
        self.own_namespace.as_ref()
    }

    /// A binding of the runtime's own namespace.
    pub fn own_namespace_get(&self, name: &str) -> EnvResult<Value> {
        let ns = self
            .own_namespace
            .as_ref()
            .ok_or_else(|| EnvError::internal("no own namespace configured"))?;
        registry::ns_env_get(ns, name, self.evaluator())
    }

    /// A namespace loaded during start-up.
    pub fn bootstrap_namespace(&self, package: &str) -> Option<&Env> {
        self.bootstrapped.get(package)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("roots", &self.roots)
            .field("templates", &self.templates)
            .field(
                "needs_active_binding_materialization",
                &self.needs_active_binding_materialization,
            )
            .field("own_namespace", &self.own_namespace)
            .field("bootstrapped", &self.bootstrapped.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

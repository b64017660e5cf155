//! `RuntimeBuilder` for configuring and building a [`Runtime`].

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Runtime;
use crate::env::{Roots, DEFAULT_ENV_SIZE};
use crate::errors::{EnvError, EnvResult};
use crate::host::{Evaluator, Parser};
use crate::registry;
use crate::template::TemplateCache;
use crate::value::{Symbol, Value};

/// Builder for a [`Runtime`].
///
/// All settings are resolved in [`build`](Self::build) and never
/// re-checked afterwards.
pub struct RuntimeBuilder {
    roots: Roots,
    evaluator: Rc<dyn Evaluator>,
    materialize_override: Option<bool>,
    default_env_size: usize,
    own_namespace: Option<String>,
    bootstrap: Vec<String>,
}

impl RuntimeBuilder {
    pub fn new(roots: Roots, evaluator: Rc<dyn Evaluator>) -> Self {
        RuntimeBuilder {
            roots,
            evaluator,
            materialize_override: None,
            default_env_size: DEFAULT_ENV_SIZE,
            own_namespace: None,
            bootstrap: Vec::new(),
        }
    }

    /// Force the active-binding fix-up on or off.
    ///
    /// By default it is on exactly when the evaluator reports that its
    /// snapshots do not invoke active bindings.
    #[must_use]
    pub fn materialize_active_bindings(mut self, needed: bool) -> Self {
        self.materialize_override = Some(needed);
        self
    }

    /// Frame size hint substituted for a zero `size` in `new_environment`.
    #[must_use]
    pub fn default_env_size(mut self, size: usize) -> Self {
        self.default_env_size = if size == 0 { DEFAULT_ENV_SIZE } else { size };
        self
    }

    /// Package whose namespace backs `own_namespace_get`. Must already be
    /// registered when `build` runs.
    #[must_use]
    pub fn own_namespace(mut self, package: &str) -> Self {
        self.own_namespace = Some(package.to_string());
        self
    }

    /// Load `package` through `asNamespace` during start-up.
    #[must_use]
    pub fn bootstrap_namespace(mut self, package: &str) -> Self {
        self.bootstrap.push(package.to_string());
        self
    }

    /// Compile the templates and resolve every setting.
    pub fn build(self, parser: &dyn Parser) -> EnvResult<Runtime> {
        let evaluator = &*self.evaluator;
        let templates = TemplateCache::compile(parser, evaluator, self.roots.base())?;

        let needs_active_binding_materialization = self
            .materialize_override
            .unwrap_or_else(|| !evaluator.materializes_active_bindings());

        let mut bootstrapped = FxHashMap::default();
        for package in &self.bootstrap {
            let ns = load_namespace(parser, evaluator, &self.roots, package)?;
            bootstrapped.insert(Symbol::new(package), ns);
        }

        let own_namespace = self
            .own_namespace
            .as_deref()
            .map(|package| registry::namespace(self.roots.registry(), package, evaluator))
            .transpose()?;

        tracing::debug!(
            needs_active_binding_materialization,
            bootstrapped = bootstrapped.len(),
            own_namespace = self.own_namespace.as_deref().unwrap_or(""),
            "environment runtime built"
        );

        Ok(Runtime {
            roots: self.roots,
            evaluator: self.evaluator,
            templates,
            needs_active_binding_materialization,
            default_env_size: self.default_env_size,
            own_namespace,
            bootstrapped,
        })
    }
}

/// Parse and evaluate `asNamespace('<package>')` in the base environment.
fn load_namespace(
    parser: &dyn Parser,
    evaluator: &dyn Evaluator,
    roots: &Roots,
    package: &str,
) -> EnvResult<crate::Env> {
    let quoted = package.replace('\\', "\\\\").replace('\'', "\\'");
    let source = format!("asNamespace('{quoted}')");
    let expr = parser.parse(&source).map_err(|err| EnvError::Parse {
        text: source.clone(),
        message: err.to_string(),
    })?;

    match evaluator.evaluate(&expr, roots.base())? {
        Value::Env(ns) => Ok(ns),
        _ => Err(EnvError::type_mismatch("namespace", "an environment")),
    }
}

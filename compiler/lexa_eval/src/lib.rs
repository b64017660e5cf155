//! Lexa Eval - reference host for the Lexa environment runtime.
//!
//! Provides the evaluator side of the `lexa_env` boundary: a small
//! tree-walking [`Interpreter`], a base environment carrying the builtins
//! the runtime's templates call, and a [`Host`] that wires them to the
//! parser from `lexa_parse`.
//!
//! ```text
//! let host = Host::new(HostConfig::default())?;
//! let runtime = host.runtime()?;
//! let env = runtime.new_environment(Some(host.roots().base()), 0)?;
//! ```

mod builtins;
mod interpreter;
mod stack;

use std::rc::Rc;
use std::sync::Once;

use lexa_env::{Env, EnvError, EnvResult, Evaluator, Expr, Roots, Runtime, RuntimeBuilder, Value};
use lexa_parse::SourceParser;

pub use interpreter::Interpreter;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Behaviour switches of the reference host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Whether `as.list.environment` invokes active bindings itself. When
    /// off, snapshots record the accessor function and the runtime has to
    /// invoke it afterwards.
    pub materialize_active_in_snapshot: bool,
}

impl HostConfig {
    /// A host whose snapshots record accessors instead of values.
    pub fn legacy() -> Self {
        HostConfig {
            materialize_active_in_snapshot: false,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            materialize_active_in_snapshot: true,
        }
    }
}

/// Roots, builtins and evaluator of one host instance.
#[derive(Debug)]
pub struct Host {
    roots: Roots,
    interpreter: Rc<Interpreter>,
}

impl Host {
    /// Fresh roots with the builtins installed in the base environment.
    pub fn new(config: HostConfig) -> EnvResult<Self> {
        let roots = Roots::new();
        builtins::install(&roots)?;
        Ok(Host {
            roots,
            interpreter: Rc::new(Interpreter::new(config)),
        })
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// A runtime builder over this host's roots and evaluator.
    pub fn runtime_builder(&self) -> RuntimeBuilder {
        let evaluator: Rc<dyn Evaluator> = self.interpreter.clone();
        Runtime::builder(self.roots.clone(), evaluator)
    }

    /// A runtime with default settings.
    pub fn runtime(&self) -> EnvResult<Runtime> {
        self.runtime_builder().build(&SourceParser)
    }

    /// Parse `source` and evaluate it in `env`.
    pub fn eval_source(&self, source: &str, env: &Env) -> EnvResult<Value> {
        let expr = parse_source(source)?;
        Ok(self.interpreter.evaluate(&expr, env)?)
    }

    /// Create a namespace for `package`, parented at the base environment,
    /// and register it.
    pub fn register_namespace(&self, package: &str) -> EnvResult<Env> {
        let ns = Env::new(self.roots.base());
        self.roots
            .registry()
            .define(package, Value::Env(ns.clone()))?;
        tracing::debug!(package, "namespace registered");
        Ok(ns)
    }

    /// Register `package` as a deferred entry: `source` is parsed now and
    /// evaluated in the base environment on first lookup.
    pub fn register_lazy_namespace(&self, package: &str, source: &str) -> EnvResult<()> {
        let expr = parse_source(source)?;
        self.roots
            .registry()
            .define_deferred(package, expr, self.roots.base())?;
        Ok(())
    }
}

fn parse_source(source: &str) -> EnvResult<Expr> {
    lexa_parse::parse(source).map_err(|err| EnvError::Parse {
        text: source.to_string(),
        message: err.to_string(),
    })
}

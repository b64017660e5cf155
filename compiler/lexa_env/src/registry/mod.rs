//! Namespace registry lookups.
//!
//! The registry environment binds each loaded package name to its
//! namespace environment. Entries may be deferred (lazy loading happens in
//! the host when the promise is forced). A miss is escalated by asking the
//! evaluator to resolve the bare name, so the caller sees the host's
//! ordinary unresolved-name error.

use crate::env::Env;
use crate::errors::{EnvError, EnvResult};
use crate::expr::Expr;
use crate::host::Evaluator;
use crate::value::Value;

/// Look `name` up in `env`'s own frame, forcing a deferred binding.
///
/// When nothing is bound, evaluates the bare symbol in `env` and returns
/// the evaluator's failure as `NotFound`.
#[tracing::instrument(level = "debug", skip(env, evaluator))]
pub fn ns_env_get(env: &Env, name: &str, evaluator: &dyn Evaluator) -> EnvResult<Value> {
    if let Some(binding) = env.binding(name) {
        return Ok(binding.resolve(evaluator)?);
    }

    match evaluator.evaluate(&Expr::sym(name), env) {
        Err(err) => {
            tracing::debug!(%err, "name not found");
            Err(EnvError::NotFound(err))
        }
        Ok(value) => Err(EnvError::internal(format!(
            "resolving missing `{name}` returned a {} instead of failing",
            value.type_name()
        ))),
    }
}

/// The namespace environment registered for `package`.
pub fn namespace(registry: &Env, package: &str, evaluator: &dyn Evaluator) -> EnvResult<Env> {
    match ns_env_get(registry, package, evaluator)? {
        Value::Env(env) => Ok(env),
        other => {
            tracing::debug!(package, got = other.type_name(), "registry entry is not an environment");
            Err(EnvError::type_mismatch("namespace", "an environment"))
        }
    }
}

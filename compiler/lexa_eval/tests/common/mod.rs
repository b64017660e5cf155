//! Shared set-up for the runtime tests.

use std::cell::Cell;
use std::rc::Rc;

use lexa_env::{Env, NativeFn, Runtime, Value};
use lexa_eval::{Host, HostConfig};

/// A host with its default runtime.
pub fn setup(config: HostConfig) -> (Host, Runtime) {
    lexa_eval::init_tracing();
    let host = Host::new(config).unwrap();
    let runtime = host.runtime().unwrap();
    (host, runtime)
}

pub fn modern() -> (Host, Runtime) {
    setup(HostConfig::default())
}

/// A child of `parent` holding `bindings` in order.
pub fn env_with(parent: &Env, bindings: &[(&str, Value)]) -> Env {
    let env = Env::new(parent);
    for (name, value) in bindings {
        env.define(*name, value.clone()).unwrap();
    }
    env
}

/// Accessor returning `value` and counting its invocations.
pub fn counting_accessor(value: i64) -> (NativeFn, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let accessor = NativeFn::accessor("counter", move || {
        seen.set(seen.get() + 1);
        Ok(Value::int(value))
    });
    (accessor, calls)
}

use lexa_env::{EnvError, EvalError, Mapping, NativeFn, TemplateKind, Value};
use lexa_eval::HostConfig;
use pretty_assertions::assert_eq;

use crate::common::{env_with, modern, setup};

fn assert_clear(rt: &lexa_env::Runtime) {
    for kind in TemplateKind::ALL {
        let template = rt.templates().get(kind);
        assert!(template.slots_are_clear(), "template `{kind}` kept a slot");
        assert!(!template.is_in_use(), "template `{kind}` still in use");
    }
}

#[test]
fn slots_cleared_after_success() {
    let (host, rt) = modern();
    let e = env_with(host.roots().base(), &[("a", Value::int(1))]);

    let mapping = rt.to_mapping(&e).unwrap();
    let copy = rt.from_mapping(&mapping, None).unwrap();
    rt.unbind_string(&copy, "a").unwrap();
    rt.new_environment(Some(&e), 0).unwrap();
    assert_clear(&rt);
}

#[test]
fn slots_cleared_after_failure() {
    let (host, rt) = modern();
    let e = env_with(host.roots().base(), &[]);
    let expr = lexa_parse::parse("stop('broken')").unwrap();
    e.define_deferred("bad", expr, host.roots().base()).unwrap();

    assert_eq!(
        rt.to_mapping(&e).unwrap_err(),
        EnvError::Eval(EvalError::new("broken"))
    );
    assert_clear(&rt);

    // Shadowing `remove` makes the removal template fail inside the host.
    host.roots().base().define("remove", Value::int(0)).unwrap();
    assert!(matches!(
        rt.unbind_string(&e, "bad"),
        Err(EnvError::Eval(_))
    ));
    assert_clear(&rt);
}

#[test]
fn evaluated_template_does_not_keep_arguments() {
    let (host, rt) = modern();
    let e = env_with(host.roots().base(), &[]);
    let probe = Value::Env(e.clone());

    rt.to_mapping(&e).unwrap();
    let slots = rt.templates().get(TemplateKind::EnvToMapping).slot_values();
    assert!(!slots.contains(&probe));
}

/// An accessor that takes a nested snapshot through the thread-wide
/// runtime while the outer one may still be running.
fn nested_snapshot_accessor(inner: lexa_env::Env) -> NativeFn {
    NativeFn::accessor("nested", move || {
        lexa_env::global::to_mapping(&inner)
            .map(|mapping: Mapping| Value::int(i64::try_from(mapping.len()).unwrap_or(-1)))
            .map_err(|err| EvalError::new(err.to_string()))
    })
}

#[test]
fn reentering_a_live_template_fails_fast() {
    let (host, rt) = modern();
    lexa_env::global::init(rt).unwrap();
    let rt = lexa_env::global::runtime().unwrap();

    let inner = env_with(host.roots().base(), &[("x", Value::Null)]);
    let outer = env_with(host.roots().base(), &[]);
    outer
        .define_active("nested", nested_snapshot_accessor(inner))
        .unwrap();

    // This host invokes accessors while the snapshot template is live.
    let err = rt.to_mapping(&outer).unwrap_err();
    assert_eq!(
        err,
        EnvError::Eval(EvalError::new(
            "internal error: template `env-to-mapping` re-entered while in use"
        ))
    );
    assert_clear(&rt);
}

#[test]
fn materialization_pass_runs_outside_the_template() {
    let (host, rt) = setup(HostConfig::legacy());
    lexa_env::global::init(rt).unwrap();
    let rt = lexa_env::global::runtime().unwrap();

    let inner = env_with(host.roots().base(), &[("x", Value::Null), ("y", Value::Null)]);
    let outer = env_with(host.roots().base(), &[]);
    outer
        .define_active("nested", nested_snapshot_accessor(inner))
        .unwrap();

    let mapping = rt.to_mapping(&outer).unwrap();
    assert_eq!(mapping.get("nested"), Some(&Value::int(2)));
    assert_clear(&rt);
}

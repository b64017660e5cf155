use lexa_env::{Env, EnvError, Symbol, Value};
use pretty_assertions::assert_eq;

use crate::common::{env_with, modern};

/// `parent {a = 1, b = 2}` <- `child {a = 10}`.
fn chain(base: &Env) -> (Env, Env) {
    let parent = env_with(base, &[("a", Value::int(1)), ("b", Value::int(2))]);
    let child = env_with(&parent, &[("a", Value::int(10))]);
    (parent, child)
}

#[test]
fn unbind_without_inheritance_touches_own_frame_only() {
    let (host, rt) = modern();
    let (parent, child) = chain(host.roots().base());

    rt.unbind_strings(&child, &["a", "b"]).unwrap();
    assert!(!child.has("a", false));
    assert!(parent.has("a", false));
    assert!(parent.has("b", false));
}

#[test]
fn unbind_with_inheritance_removes_nearest_binding() {
    let (host, rt) = modern();
    let (parent, child) = chain(host.roots().base());

    rt.unbind_anywhere_strings(&child, &["a", "b"]).unwrap();
    assert!(!child.has("a", false));
    assert!(parent.has("a", false), "only the nearest `a` goes");
    assert!(!parent.has("b", false));
}

#[test]
fn unbind_keeps_remaining_order() {
    let (host, rt) = modern();
    let e = env_with(
        host.roots().base(),
        &[("x", Value::Null), ("y", Value::Null), ("z", Value::Null)],
    );

    rt.unbind_string(&e, "y").unwrap();
    assert_eq!(e.names(true), vec![Symbol::new("x"), Symbol::new("z")]);
}

#[test]
fn absent_names_are_ignored() {
    let (host, rt) = modern();
    let (parent, child) = chain(host.roots().base());

    rt.unbind_string_anywhere(&child, "ghost").unwrap();
    rt.unbind_names(&child, &[Symbol::new("ghost")]).unwrap();
    assert_eq!(parent.binding_count(), 2);
    assert_eq!(child.binding_count(), 1);
}

#[test]
fn typed_wrappers() {
    let (host, rt) = modern();
    let (parent, child) = chain(host.roots().base());

    rt.unbind_anywhere_names(&child, &[Symbol::new("b")]).unwrap();
    assert!(!parent.has("b", false));
    rt.unbind_names(&child, &[Symbol::new("a")]).unwrap();
    assert_eq!(child.binding_count(), 0);
}

#[test]
fn dynamic_unbind_validates_arguments() {
    let (host, rt) = modern();
    let (parent, child) = chain(host.roots().base());
    let env = Value::Env(child);
    let names = Value::strings(["b"]);

    assert_eq!(
        rt.unbind(&Value::int(0), &names, &Value::bool(false)).unwrap_err(),
        EnvError::type_mismatch("env", "an environment")
    );
    assert_eq!(
        rt.unbind(&env, &Value::Null, &Value::bool(false)).unwrap_err(),
        EnvError::type_mismatch("names", "a character vector")
    );
    assert_eq!(
        rt.unbind(&env, &names, &Value::string("yes")).unwrap_err(),
        EnvError::type_mismatch("inherits", "a scalar logical vector")
    );
    assert!(parent.has("b", false));

    rt.unbind(&env, &names, &Value::bool(true)).unwrap();
    assert!(!parent.has("b", false));
}

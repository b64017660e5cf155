use lexa_env::{Env, EnvError, Value};
use pretty_assertions::assert_eq;

use crate::common::{env_with, modern};

#[test]
fn env_is_its_own_ancestor() {
    let (host, rt) = modern();
    let e = Value::Env(env_with(host.roots().base(), &[]));
    let empty = Value::Env(Env::empty());

    assert!(rt.is_ancestor(&e, &e, Some(&empty)).unwrap());
    assert!(rt.is_ancestor(&e, &e, None).unwrap());
}

#[test]
fn empty_env_has_no_other_ancestors() {
    let (host, rt) = modern();
    let empty = Value::Env(Env::empty());
    let base = Value::Env(host.roots().base().clone());

    assert!(!rt.is_ancestor(&empty, &base, None).unwrap());
    assert!(rt.is_ancestor(&empty, &empty, None).unwrap());
}

#[test]
fn chain_reaches_base_and_empty() {
    let (host, rt) = modern();
    let base = host.roots().base();
    let a = env_with(base, &[]);
    let b = env_with(&a, &[]);
    let c = Value::Env(env_with(&b, &[]));

    assert!(rt.is_ancestor(&c, &Value::Env(a.clone()), None).unwrap());
    assert!(rt.is_ancestor(&c, &Value::Env(base.clone()), None).unwrap());
    assert!(rt.is_ancestor(&c, &Value::Env(Env::empty()), None).unwrap());

    // Stopping at `b` hides everything above it.
    let top = Value::Env(b);
    assert!(!rt.is_ancestor(&c, &Value::Env(a), Some(&top)).unwrap());
    assert!(rt.is_ancestor(&c, &top, Some(&top)).unwrap());
}

#[test]
fn unrelated_env_is_not_an_ancestor() {
    let (host, rt) = modern();
    let left = Value::Env(env_with(host.roots().base(), &[]));
    let right = Value::Env(env_with(host.roots().base(), &[]));
    assert!(!rt.is_ancestor(&left, &right, None).unwrap());
}

#[test]
fn non_env_arguments_are_rejected() {
    let (_host, rt) = modern();
    let err = rt
        .is_ancestor(&Value::string("e"), &Value::Env(Env::empty()), None)
        .unwrap_err();
    assert_eq!(err, EnvError::type_mismatch("env", "an environment"));
    assert_eq!(err.to_string(), "`env` must be an environment");
}

use lexa_env::{global, EnvError, Value};
use pretty_assertions::assert_eq;

use crate::common::{env_with, modern};

#[test]
fn refuses_use_before_init() {
    assert!(!global::is_initialized());
    assert_eq!(
        global::namespace("base").unwrap_err(),
        EnvError::NotInitialized
    );
    assert_eq!(
        global::is_ancestor(&Value::Null, &Value::Null, None).unwrap_err(),
        EnvError::NotInitialized
    );
}

#[test]
fn refuses_second_init() {
    let (_host, first) = modern();
    let (_other, second) = modern();

    global::init(first).unwrap();
    assert_eq!(global::init(second).unwrap_err(), EnvError::AlreadyInitialized);
    assert!(global::is_initialized());
}

#[test]
fn free_functions_forward_to_the_runtime() {
    let (host, rt) = modern();
    global::init(rt).unwrap();
    let ns = host.register_namespace("pkg").unwrap();
    ns.define("v", Value::int(5)).unwrap();

    assert!(global::namespace("pkg").unwrap().ptr_eq(&ns));
    assert_eq!(global::ns_get(&ns, "v").unwrap(), Value::int(5));
    assert!(matches!(global::base_get("c").unwrap(), Value::Function(_)));
    assert!(matches!(
        global::own_namespace_get("v"),
        Err(EnvError::Internal(_))
    ));

    let e = env_with(host.roots().base(), &[("a", Value::int(1)), ("b", Value::int(2))]);
    let copy = global::clone_env(&e, None).unwrap();
    global::unbind_anywhere_strings(&copy, &["a"]).unwrap();
    global::unbind_anywhere_names(&copy, &[lexa_env::Symbol::new("b")]).unwrap();
    assert_eq!(global::to_mapping(&copy).unwrap().len(), 0);
    assert_eq!(global::to_mapping(&e).unwrap().len(), 2);

    global::unbind(&Value::Env(e.clone()), &Value::strings(["a"]), &Value::bool(false)).unwrap();
    global::unbind_names(&e, &[lexa_env::Symbol::new("b")]).unwrap();
    assert_eq!(e.binding_count(), 0);

    let fresh = global::new_environment(None, 0).unwrap();
    let filled = global::from_mapping(
        &[("k", Value::Null)].into_iter().collect(),
        Some(&fresh),
    )
    .unwrap();
    global::unbind_string(&filled, "k").unwrap();
    global::unbind_string_anywhere(&filled, "k").unwrap();
    global::unbind_strings(&filled, &[]).unwrap();
    assert!(global::is_ancestor(
        &Value::Env(filled),
        &Value::Env(fresh),
        None
    )
    .unwrap());
}

use lexa_env::errors::undefined_variable;
use lexa_env::{BindingKind, EnvError, Value};
use lexa_eval::HostConfig;
use pretty_assertions::assert_eq;

use crate::common::{modern, setup};

#[test]
fn namespace_lookup_is_idempotent() {
    let (host, rt) = modern();
    let ns = host.register_namespace("pkg").unwrap();

    let first = rt.namespace("pkg").unwrap();
    let second = rt.namespace("pkg").unwrap();
    assert!(first.ptr_eq(&ns));
    assert!(second.ptr_eq(&first));
}

#[test]
fn lazy_namespace_is_forced_once() {
    let (host, rt) = modern();
    host.register_lazy_namespace("lazy", "list2env(list(answer = 42L))")
        .unwrap();
    let calls_before = host.interpreter().calls();

    let first = rt.namespace("lazy").unwrap();
    let calls_after_first = host.interpreter().calls();
    let second = rt.namespace("lazy").unwrap();

    assert!(first.ptr_eq(&second));
    assert!(calls_after_first > calls_before);
    assert_eq!(host.interpreter().calls(), calls_after_first);
    assert_eq!(
        host.roots().registry().binding_kinds()[0].1,
        BindingKind::Deferred { forced: true }
    );
    assert_eq!(rt.ns_get(&first, "answer").unwrap(), Value::int(42));
}

#[test]
fn missing_namespace_reports_host_error() {
    let (_host, rt) = modern();
    let err = rt.namespace("nope").unwrap_err();
    assert_eq!(err, EnvError::NotFound(undefined_variable("nope")));
    assert_eq!(err.to_string(), "object `nope` not found");
}

#[test]
fn namespace_entry_must_be_an_environment() {
    let (host, rt) = modern();
    host.roots().registry().define("odd", Value::int(1)).unwrap();
    assert_eq!(
        rt.namespace("odd").unwrap_err(),
        EnvError::type_mismatch("namespace", "an environment")
    );
}

#[test]
fn ns_get_and_base_get() {
    let (host, rt) = modern();
    let ns = host.register_namespace("pkg").unwrap();
    ns.define("f", Value::string("exported")).unwrap();

    assert_eq!(rt.ns_get(&ns, "f").unwrap(), Value::string("exported"));
    assert!(matches!(rt.ns_get(&ns, "g"), Err(EnvError::NotFound(_))));
    assert!(matches!(
        rt.base_get("list2env").unwrap(),
        Value::Function(_)
    ));
}

#[test]
fn ns_get_escalation_sees_parents_as_internal_error() {
    // `ns_get` only looks at the namespace's own frame; a name that only
    // resolves through the parent chain breaks the escalation contract.
    let (host, rt) = modern();
    let ns = host.register_namespace("pkg").unwrap();
    assert!(matches!(rt.ns_get(&ns, "list"), Err(EnvError::Internal(_))));
}

#[test]
fn own_namespace_and_bootstrap() {
    let host = lexa_eval::Host::new(HostConfig::default()).unwrap();
    let own = host.register_namespace("lexa").unwrap();
    own.define("version", Value::string("0.1")).unwrap();
    host.register_lazy_namespace("methods", "new.env()").unwrap();

    let rt = host
        .runtime_builder()
        .own_namespace("lexa")
        .bootstrap_namespace("methods")
        .build(&lexa_parse::SourceParser)
        .unwrap();

    assert!(rt.own_namespace().unwrap().ptr_eq(&own));
    assert_eq!(rt.own_namespace_get("version").unwrap(), Value::string("0.1"));
    let methods = rt.bootstrap_namespace("methods").unwrap();
    assert!(methods.ptr_eq(&rt.namespace("methods").unwrap()));
}

#[test]
fn bootstrap_of_unknown_package_fails_build() {
    let (host, _) = setup(HostConfig::default());
    let err = host
        .runtime_builder()
        .bootstrap_namespace("nope")
        .build(&lexa_parse::SourceParser)
        .unwrap_err();
    assert_eq!(err.to_string(), "there is no package called `nope`");
}

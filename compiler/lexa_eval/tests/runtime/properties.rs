use lexa_env::{Env, Mapping, Symbol, Value};
use proptest::prelude::*;

use crate::common::modern;

/// Distinct binding names, hidden ones included, in generation order.
fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("\\.?[a-z][a-z0-9_.]{0,6}", 0..12).prop_map(|names| {
        let mut seen = std::collections::HashSet::new();
        names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_round_trip_keeps_frame(names in names(), seed in any::<i64>()) {
        let (host, rt) = modern();
        let env = Env::new(host.roots().base());
        for (offset, name) in (0_i64..).zip(&names) {
            env.define(name.as_str(), Value::int(seed.wrapping_add(offset))).unwrap();
        }

        let mapping = rt.to_mapping(&env).unwrap();
        let order: Vec<&str> = mapping.names().map(Symbol::as_str).collect();
        prop_assert_eq!(order, names.iter().map(String::as_str).collect::<Vec<_>>());

        let rebuilt = rt.from_mapping(&mapping, None).unwrap();
        let again: Mapping = rt.to_mapping(&rebuilt).unwrap();
        prop_assert_eq!(again, mapping);
        prop_assert!(rt.templates().all_clear());
    }

    #[test]
    fn prop_every_chain_member_is_an_ancestor(depth in 1_usize..24, pick in any::<prop::sample::Index>()) {
        let (host, rt) = modern();
        let mut chain = vec![host.roots().base().clone()];
        for _ in 0..depth {
            let next = Env::new(chain.last().unwrap());
            chain.push(next);
        }
        let leaf = Value::Env(chain.last().unwrap().clone());
        let ancestor = Value::Env(pick.get(&chain).clone());

        prop_assert!(rt.is_ancestor(&leaf, &ancestor, None).unwrap());
        prop_assert!(!rt.is_ancestor(&ancestor, &Value::Env(Env::new(&Env::empty())), None).unwrap());
    }

    #[test]
    fn prop_unbind_removes_exactly_the_requested_names(names in names(), mask in any::<u16>()) {
        let (host, rt) = modern();
        let env = Env::new(host.roots().base());
        for name in &names {
            env.define(name.as_str(), Value::Null).unwrap();
        }
        let (gone, kept): (Vec<(usize, &String)>, Vec<(usize, &String)>) =
            names.iter().enumerate().partition(|(i, _)| mask & (1 << i) != 0);
        let gone: Vec<&str> = gone.into_iter().map(|(_, name)| name.as_str()).collect();

        rt.unbind_strings(&env, &gone).unwrap();

        let left: Vec<String> = env.names(true).iter().map(ToString::to_string).collect();
        let expected: Vec<String> = kept.into_iter().map(|(_, name)| name.clone()).collect();
        prop_assert_eq!(left, expected);
    }
}

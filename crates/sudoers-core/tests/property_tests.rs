use proptest::prelude::*;
use sudoers_core::{accounts_equivalent, needs_resync};
use sudoers_meta::Account;

fn rule_set() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z=()/: ]{1,24}", 0..6)
}

/// A rule list together with a permutation of itself.
fn permuted_rules() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    rule_set().prop_flat_map(|rules| (Just(rules.clone()), Just(rules).prop_shuffle()))
}

proptest! {
    #[test]
    fn test_rule_order_is_irrelevant((rules, shuffled) in permuted_rules()) {
        let first = vec![Account::new("alice", rules)];
        let second = vec![Account::new("alice", shuffled)];
        prop_assert!(accounts_equivalent(&first, &second));
        prop_assert!(!needs_resync(false, false, &first, &second));
    }

    #[test]
    fn test_extra_rule_is_detected(
        rules in rule_set(),
        extra in "[a-z]{1,8}-extra",
    ) {
        let mut extended = rules.clone();
        extended.push(extra);

        let first = vec![Account::new("alice", rules)];
        let second = vec![Account::new("alice", extended)];
        prop_assert!(!accounts_equivalent(&first, &second));
    }

    #[test]
    fn test_list_order_is_irrelevant(
        (names, shuffled) in prop::collection::hash_set("[a-z]{1,8}", 0..6)
            .prop_map(|names| names.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|names| (Just(names.clone()), Just(names).prop_shuffle())),
        rules in rule_set(),
    ) {
        let first: Vec<Account> = names
            .iter()
            .map(|name| Account::new(name.clone(), rules.clone()))
            .collect();
        let second: Vec<Account> = shuffled
            .iter()
            .map(|name| Account::new(name.clone(), rules.clone()))
            .collect();
        prop_assert!(accounts_equivalent(&first, &second));
    }

    #[test]
    fn test_enablement_flip_always_resyncs(rules in rule_set(), enabled in any::<bool>()) {
        let accounts = vec![Account::new("alice", rules)];
        prop_assert!(needs_resync(enabled, !enabled, &accounts, &accounts));
    }
}

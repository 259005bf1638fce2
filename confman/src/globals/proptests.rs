//! Property-based tests for global property substitution.

use super::GlobalPropertyTable;
use crate::error::Error;
use proptest::prelude::*;

// Strings that never contain a reference opener
fn plain_string_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /_.:$}{-]{0,40}".prop_filter("no reference opener", |s| !s.contains("${"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Substitution is the identity on strings without references
    #[test]
    fn resolve_is_identity_on_plain_strings(s in plain_string_strategy()) {
        let globals = GlobalPropertyTable::new();
        prop_assert_eq!(globals.resolve("o", "p", &s).unwrap(), s);
    }

    // A chain of any depth resolves to the value at its end
    #[test]
    fn reference_chains_resolve_fully(depth in 1usize..40, tail in "[a-z]{1,10}") {
        let mut globals = GlobalPropertyTable::new();
        for i in 0..depth {
            globals.set(format!("v{i}"), format!("${{v{}}}", i + 1));
        }
        globals.set(format!("v{depth}"), tail.clone());

        prop_assert_eq!(globals.resolve("o", "p", "${v0}").unwrap(), tail);
    }

    // Closing a chain into a loop is always reported as a cycle
    #[test]
    fn cyclic_chains_are_rejected(depth in 1usize..20) {
        let mut globals = GlobalPropertyTable::new();
        for i in 0..depth {
            globals.set(format!("c{i}"), format!("x${{c{}}}", (i + 1) % depth));
        }

        let err = globals.resolve("o", "p", "${c0}").unwrap_err();
        match err {
            Error::CyclicGlobalProperty { cycle, .. } => {
                prop_assert_eq!(cycle.len(), depth + 1);
                prop_assert_eq!(cycle.first(), cycle.last());
            }
            other => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    // Literal text around references is preserved
    #[test]
    fn surrounding_text_is_preserved(
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
        value in "[a-z0-9]{0,10}"
    ) {
        let mut globals = GlobalPropertyTable::new();
        globals.set("name", value.clone());
        let raw = format!("{prefix}${{name}}{suffix}");
        prop_assert_eq!(globals.resolve("o", "p", &raw).unwrap(), format!("{prefix}{value}{suffix}"));
    }
}

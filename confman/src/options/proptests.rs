//! Property-based tests for value tokenizing.

use super::Tokenizer;
use proptest::prelude::*;

fn item_strategy() -> impl Strategy<Value = String> {
    r#"[a-z0-9,"\\^ ]{0,12}"#
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Joining with escapes and splitting again is lossless
    #[test]
    fn join_then_split_is_lossless(items in prop::collection::vec(item_strategy(), 2..8)) {
        let tokenizer = Tokenizer::new(',', '"', '\\');
        let joined = tokenizer.join(&items);
        prop_assert_eq!(tokenizer.split(&joined), items);
    }

    // Text without special characters splits exactly like str::split
    #[test]
    fn plain_text_matches_str_split(s in "[a-z ,]{1,40}") {
        let tokenizer = Tokenizer::default();
        let expected: Vec<String> = s.split(',').map(str::to_string).collect();
        prop_assert_eq!(tokenizer.split(&s), expected);
    }

    // The number of elements is one more than the unquoted delimiters
    #[test]
    fn element_count_follows_delimiters(parts in prop::collection::vec("[a-z]{0,5}", 1..10)) {
        let tokenizer = Tokenizer::default();
        let input = parts.join(",");
        prop_assume!(!input.is_empty());
        prop_assert_eq!(tokenizer.split(&input).len(), parts.len());
    }
}

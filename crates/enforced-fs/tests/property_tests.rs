use enforced_fs::{CanonicalPath, Mode};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_canonicalization_invariants(s in "(/|[a-c]{1,2}|\\.|\\.\\.){0,12}") {
        let path = CanonicalPath::new(&s);
        let as_str = path.as_str();

        // No repeated separators
        prop_assert!(!as_str.contains("//"));

        // No trailing separator except the root
        prop_assert!(as_str == "/" || !as_str.ends_with('/'));

        // Absolute paths contain no dot components at all
        if path.is_absolute() {
            prop_assert!(path.components().all(|c| c != "." && c != ".."));
        }

        // Absoluteness is preserved
        prop_assert_eq!(path.is_absolute(), s.starts_with('/'));

        // Cleaning is idempotent
        let again = CanonicalPath::new(as_str);
        prop_assert_eq!(&again, &path);
    }

    #[test]
    fn test_join_extends_components(base in "(/[a-c]{1,3}){0,4}", leaf in "[a-c]{1,3}") {
        let base = CanonicalPath::new(if base.is_empty() { "/" } else { base.as_str() });
        let joined = base.join(&leaf);

        prop_assert!(joined.starts_with(&base));
        prop_assert_eq!(joined.components().count(), base.components().count() + 1);
        prop_assert_eq!(joined.file_name(), Some(leaf.as_str()));
    }

    #[test]
    fn test_mode_parse_matches_octal_value(value in 0u32..=0o777) {
        let text = format!("{value:o}");
        prop_assert_eq!(Mode::parse_octal(&text).map(Mode::bits), Some(value));
    }

    #[test]
    fn test_mode_rejects_values_above_nine_bits(value in 0o1000u32..0o100000) {
        let text = format!("{value:o}");
        prop_assert_eq!(Mode::parse_octal(&text), None);
    }
}

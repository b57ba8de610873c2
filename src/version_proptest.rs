//! Property-based tests for version ordering and bumping.
//!
//! These tests use proptest to generate random version triples and verify
//! that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::normalize_path;
    use crate::version::{
        format_tag, highest_version, next_version, parse_version_tag, BumpKind,
    };
    use proptest::prelude::*;
    use semver::Version;

    fn triple() -> impl Strategy<Value = (u64, u64, u64)> {
        (0u64..50, 0u64..50, 0u64..50)
    }

    // ============================================================================
    // highest_version property tests
    // ============================================================================

    proptest! {
        /// Property: the highest tag is the numeric maximum of the triples
        #[test]
        fn highest_matches_numeric_max(triples in prop::collection::vec(triple(), 1..20)) {
            let tags: Vec<String> = triples
                .iter()
                .map(|(a, b, c)| format!("v{}.{}.{}", a, b, c))
                .collect();

            let (_, highest) = highest_version(&tags).unwrap();
            let max = triples.iter().max().unwrap();
            prop_assert_eq!(highest, Version::new(max.0, max.1, max.2));
        }

        /// Property: non-version tags never change the result
        #[test]
        fn highest_ignores_noise(triples in prop::collection::vec(triple(), 1..10), noise in "[a-z]{1,8}") {
            let mut tags: Vec<String> = triples
                .iter()
                .map(|(a, b, c)| format!("v{}.{}.{}", a, b, c))
                .collect();
            let clean = highest_version(&tags).map(|(_, v)| v);

            tags.push(noise);
            prop_assert_eq!(highest_version(&tags).map(|(_, v)| v), clean);
        }
    }

    // ============================================================================
    // next_version property tests
    // ============================================================================

    proptest! {
        /// Property: every bump produces a strictly greater version
        #[test]
        fn bump_is_strictly_increasing((a, b, c) in triple()) {
            let current = Version::new(a, b, c);
            for kind in [BumpKind::Major, BumpKind::Minor, BumpKind::Fix] {
                prop_assert!(next_version(&current, kind).unwrap() > current);
            }
        }

        /// Property: formatted tags parse back to the same version
        #[test]
        fn formatted_tag_parses_back((a, b, c) in triple()) {
            let version = Version::new(a, b, c);
            prop_assert_eq!(parse_version_tag(&format_tag(&version)), Some(version));
        }

        /// Property: a fix bump never touches major or minor
        #[test]
        fn fix_keeps_major_minor((a, b, c) in triple()) {
            let next = next_version(&Version::new(a, b, c), BumpKind::Fix).unwrap();
            prop_assert_eq!((next.major, next.minor, next.patch), (a, b, c + 1));
        }
    }

    // ============================================================================
    // normalize_path property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing is idempotent
        #[test]
        fn normalize_path_is_idempotent(input in "(\\./)*[a-z/]{0,12}/*") {
            let once = normalize_path(&input);
            prop_assert_eq!(normalize_path(&once), once.clone());
        }
    }
}

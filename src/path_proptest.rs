//! Property-based tests for path canonicalization and key derivation.
//!
//! These tests use proptest to generate random spellings of paths and check
//! that every spelling of the same location hashes to the same key.

#[cfg(test)]
mod proptest_tests {
    use crate::backend::HostBackend;
    use crate::facade::FacadeFileSystem;
    use crate::key::PathKey;
    use crate::path::{canonicalize, glob_match, join_paths, relative_to};
    use proptest::prelude::*;

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..6)
    }

    // ============================================================================
    // canonicalize property tests
    // ============================================================================

    proptest! {
        /// Property: canonicalize is idempotent
        #[test]
        fn canonicalize_is_idempotent(input in r"[a-zA-Z0-9_./\\]{0,40}") {
            let once = canonicalize(&input);
            prop_assert_eq!(canonicalize(&once), once);
        }

        /// Property: canonical paths never end with a separator, except the root
        #[test]
        fn canonical_paths_have_no_trailing_separator(input in r"[a-z/.\\]{0,30}") {
            let result = canonicalize(&input);
            prop_assert!(result == "/" || !result.ends_with('/'));
            prop_assert!(!result.contains("//"));
            prop_assert!(!result.contains('\\'));
        }

        /// Property: redundant separators, `.` segments and a trailing
        /// separator do not change the key
        #[test]
        fn redundant_spellings_share_a_key(segs in segments()) {
            let plain = format!("/{}", segs.join("/"));
            let doubled = format!("//{}", segs.join("//"));
            let dotted = format!("/./{}/", segs.join("/./"));
            let backslashed = format!("\\{}", segs.join("\\"));

            let key = PathKey::derive(&plain);
            prop_assert_eq!(PathKey::derive(&doubled), key);
            prop_assert_eq!(PathKey::derive(&dotted), key);
            prop_assert_eq!(PathKey::derive(&backslashed), key);
        }

        /// Property: `x/..` cancels out
        #[test]
        fn parent_segments_cancel(segs in segments(), detour in "[a-z]{1,8}") {
            let plain = format!("/{}", segs.join("/"));
            let with_detour = format!("/{}/../{}", detour, segs.join("/"));
            prop_assert_eq!(canonicalize(&with_detour), canonicalize(&plain));
        }

        /// Property: on the host, a relative spelling and its absolute
        /// spelling under the working directory share a key
        #[test]
        fn relative_and_absolute_spellings_share_a_key(
            segs in segments(),
            detour in "[a-z]{1,6}",
        ) {
            let fs = FacadeFileSystem::new(Box::new(HostBackend::new()));
            let cwd = std::env::current_dir().unwrap();
            let relative = format!("./{}/../{}", detour, segs.join("//"));
            let absolute = cwd.join(segs.join("/")).to_string_lossy().into_owned();

            prop_assert_eq!(fs.key_of(&relative), fs.key_of(&absolute));
            prop_assert_ne!(fs.key_of(&relative), PathKey::derive(&relative));
        }

        /// Property: case is significant
        #[test]
        fn case_is_preserved(name in "[a-z]{1,10}") {
            let upper = name.to_uppercase();
            prop_assert_ne!(
                PathKey::derive(&format!("/{}", name)),
                PathKey::derive(&format!("/{}", upper))
            );
        }
    }

    // ============================================================================
    // join_paths / relative_to property tests
    // ============================================================================

    proptest! {
        /// Property: relative_to undoes join_paths
        #[test]
        fn relative_to_inverts_join(base in segments(), rest in segments()) {
            let base = format!("/{}", base.join("/"));
            let relative = rest.join("/");
            let joined = join_paths(&base, &[relative.as_str()]).unwrap();
            prop_assert_eq!(relative_to(&base, &joined), Some(relative));
        }

        /// Property: glob pattern "*" matches any single path component but
        /// never crosses a separator
        #[test]
        fn glob_star_stays_in_one_component(
            a in "[a-zA-Z0-9_][a-zA-Z0-9_.]{0,9}",
            b in "[a-zA-Z0-9_]{1,10}"
        ) {
            prop_assert!(glob_match("*", &a).unwrap());
            let nested = format!("{}/{}", a, b);
            prop_assert!(!glob_match("*", &nested).unwrap());
            prop_assert!(glob_match("**/*", &nested).unwrap());
        }
    }
}

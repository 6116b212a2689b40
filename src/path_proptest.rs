//! Property-based tests for path composition.
//!
//! These tests use proptest to generate random coordinates and verify that
//! the layout invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::artifact::{Artifact, Metadata};
    use crate::path::PathComposer;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,8}"
    }

    fn group() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|parts| parts.join("."))
    }

    fn version() -> impl Strategy<Value = String> {
        "[0-9]{1,2}\\.[0-9]{1,2}(-SNAPSHOT)?"
    }

    // ============================================================================
    // path_for_artifact property tests
    // ============================================================================

    proptest! {
        /// Property: artifact paths are a pure function of their inputs
        #[test]
        fn artifact_path_is_deterministic(
            g in group(),
            a in segment(),
            v in version(),
            local in any::<bool>(),
        ) {
            let composer = PathComposer::new();
            let artifact = Artifact::new(&g, &a, "", "jar", &v);
            prop_assert_eq!(
                composer.path_for_artifact(&artifact, local),
                composer.path_for_artifact(&artifact.clone(), local)
            );
        }

        /// Property: changing only the classifier changes only the classifier segment
        #[test]
        fn classifier_only_affects_classifier_segment(
            g in group(),
            a in segment(),
            v in version(),
            c1 in segment(),
            c2 in segment(),
        ) {
            let composer = PathComposer::new();
            let first = Artifact::new(&g, &a, &c1, "jar", &v);
            let second = first.with_classifier(&c2);
            let p1 = composer.path_for_artifact(&first, false);
            let p2 = composer.path_for_artifact(&second, false);

            let base = format!("{}-{}", a, v);
            prop_assert_eq!(
                p1.replace(&format!("{}-{}.jar", base, c1), ""),
                p2.replace(&format!("{}-{}.jar", base, c2), "")
            );
            let suffix1 = format!("-{}.jar", c1);
            let suffix2 = format!("-{}.jar", c2);
            prop_assert!(p1.ends_with(&suffix1));
            prop_assert!(p2.ends_with(&suffix2));
        }

        /// Property: the group id becomes directories, the rest stays below it
        #[test]
        fn artifact_path_starts_with_group_directories(
            g in group(),
            a in segment(),
            v in version(),
        ) {
            let composer = PathComposer::new();
            let artifact = Artifact::new(&g, &a, "", "pom", &v);
            let path = composer.path_for_artifact(&artifact, true);
            let expected_prefix = format!("{}/{}/{}/", g.replace('.', "/"), a, v);
            prop_assert!(path.starts_with(&expected_prefix));
            prop_assert!(!path.contains("//"));
        }

        /// Property: local and remote paths agree for non-timestamped versions
        #[test]
        fn local_and_remote_agree_without_timestamp(
            g in group(),
            a in segment(),
            v in version(),
        ) {
            let composer = PathComposer::new();
            let artifact = Artifact::new(&g, &a, "", "jar", &v);
            prop_assert_eq!(
                composer.path_for_artifact(&artifact, true),
                composer.path_for_artifact(&artifact, false)
            );
        }
    }

    // ============================================================================
    // path_for_metadata property tests
    // ============================================================================

    proptest! {
        /// Property: metadata paths never contain empty segments
        #[test]
        fn metadata_path_has_no_empty_segments(
            g in prop::option::of(group()),
            a in prop::option::of(segment()),
            v in prop::option::of(version()),
            key in segment(),
        ) {
            let composer = PathComposer::new();
            let metadata = Metadata::new(
                g.as_deref().unwrap_or(""),
                a.as_deref().unwrap_or(""),
                v.as_deref().unwrap_or(""),
                "maven-metadata.xml",
            );
            let path = composer.path_for_metadata(&metadata, &key);
            prop_assert!(!path.starts_with('/'));
            prop_assert!(!path.contains("//"));
            let expected_suffix = format!("maven-metadata-{}.xml", key);
            prop_assert!(path.ends_with(&expected_suffix));
        }
    }
}

//! Relative path layout of artifacts and metadata inside a local repository

use crate::artifact::{Artifact, Metadata};

/// Maps coordinates to paths relative to the repository root
///
/// The composer is stateless; it never touches the disk and equal inputs
/// always produce equal paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathComposer;

impl PathComposer {
    pub fn new() -> Self {
        Self
    }

    /// Path of an artifact file.
    ///
    /// `group/as/dirs/artifactId/baseVersion/artifactId-version[-classifier][.extension]`,
    /// where `version` is the base version for local installs and the resolved
    /// version otherwise.
    pub fn path_for_artifact(&self, artifact: &Artifact, local: bool) -> String {
        let mut path = String::with_capacity(128);
        path.push_str(&artifact.group_id().replace('.', "/"));
        path.push('/');
        path.push_str(artifact.artifact_id());
        path.push('/');
        path.push_str(artifact.base_version());
        path.push('/');
        path.push_str(artifact.artifact_id());
        path.push('-');
        if local {
            path.push_str(artifact.base_version());
        } else {
            path.push_str(artifact.version());
        }
        if !artifact.classifier().is_empty() {
            path.push('-');
            path.push_str(artifact.classifier());
        }
        if !artifact.extension().is_empty() {
            path.push('.');
            path.push_str(artifact.extension());
        }
        path
    }

    /// Path of a metadata document stored on behalf of `repository_key`.
    ///
    /// Empty coordinate segments are left out, and the repository key is
    /// spliced into the file name so documents of different origins do not
    /// overwrite each other.
    pub fn path_for_metadata(&self, metadata: &Metadata, repository_key: &str) -> String {
        let mut path = String::with_capacity(128);
        if !metadata.group_id().is_empty() {
            path.push_str(&metadata.group_id().replace('.', "/"));
            path.push('/');
        }
        if !metadata.artifact_id().is_empty() {
            path.push_str(metadata.artifact_id());
            path.push('/');
        }
        if !metadata.version().is_empty() {
            path.push_str(metadata.version());
            path.push('/');
        }
        path.push_str(&insert_repository_key(metadata.r#type(), repository_key));
        path
    }
}

/// Splices `-key` before the last extension of the last segment of `file_type`.
fn insert_repository_key(file_type: &str, repository_key: &str) -> String {
    match file_type.split_once('/') {
        Some((head, tail)) => {
            format!("{}/{}", head, insert_repository_key(tail, repository_key))
        }
        None => match file_type.rfind('.') {
            Some(dot) => format!(
                "{}-{}{}",
                &file_type[..dot],
                repository_key,
                &file_type[dot..]
            ),
            None => format!("{}-{}", file_type, repository_key),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(coordinate: &str) -> Artifact {
        coordinate.parse().unwrap()
    }

    #[test]
    fn test_local_artifact_path() {
        let composer = PathComposer::new();
        assert_eq!(
            composer.path_for_artifact(&artifact("com.example:lib:1.0"), true),
            "com/example/lib/1.0/lib-1.0.jar"
        );
    }

    #[test]
    fn test_classifier_and_extension() {
        let composer = PathComposer::new();
        assert_eq!(
            composer.path_for_artifact(&artifact("org.acme:core:zip:dist:2.0"), false),
            "org/acme/core/2.0/core-2.0-dist.zip"
        );
        assert_eq!(
            composer.path_for_artifact(&Artifact::new("g", "a", "", "", "1"), false),
            "g/a/1/a-1"
        );
    }

    #[test]
    fn test_timestamped_snapshot_paths() {
        let composer = PathComposer::new();
        let snapshot = artifact("com.example:lib:1.0-20240101.120000-3");
        assert_eq!(
            composer.path_for_artifact(&snapshot, true),
            "com/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar"
        );
        assert_eq!(
            composer.path_for_artifact(&snapshot, false),
            "com/example/lib/1.0-SNAPSHOT/lib-1.0-20240101.120000-3.jar"
        );
    }

    #[test]
    fn test_metadata_path_without_version() {
        let composer = PathComposer::new();
        let metadata = Metadata::new("com.example", "lib", "", "maven-metadata.xml");
        assert_eq!(
            composer.path_for_metadata(&metadata, "central"),
            "com/example/lib/maven-metadata-central.xml"
        );
    }

    #[test]
    fn test_metadata_path_group_level() {
        let composer = PathComposer::new();
        let metadata = Metadata::new("org.acme", "", "", "maven-metadata.xml");
        assert_eq!(
            composer.path_for_metadata(&metadata, "local"),
            "org/acme/maven-metadata-local.xml"
        );
        let root = Metadata::new("", "", "", "archetype-catalog.xml");
        assert_eq!(
            composer.path_for_metadata(&root, "local"),
            "archetype-catalog-local.xml"
        );
    }

    #[test]
    fn test_metadata_type_with_slashes() {
        let composer = PathComposer::new();
        let metadata = Metadata::new("g", "a", "1.0", "index/nexus.properties");
        assert_eq!(
            composer.path_for_metadata(&metadata, "central"),
            "g/a/1.0/index/nexus-central.properties"
        );
    }

    #[test]
    fn test_insert_repository_key() {
        assert_eq!(insert_repository_key("resolver-status", "r"), "resolver-status-r");
        assert_eq!(insert_repository_key("a.tar.gz", "r"), "a.tar-r.gz");
        assert_eq!(insert_repository_key("x/y/z.xml", "r"), "x/y/z-r.xml");
    }
}

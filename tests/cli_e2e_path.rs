//! End-to-end tests for the `local-repo path` command.
//!
//! These tests verify the CLI behavior of the `path` command by invoking
//! the binary directly and checking its output.
//!
//! Run with:
//! cargo test --features integration-tests --test cli_e2e_path

mod common;
use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_help() {
    TestFixture::new()
        .command()
        .arg("path")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Print the path of an artifact or metadata document",
        ));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_of_local_artifact() {
    TestFixture::new()
        .command()
        .args(["path", "com.example:lib:1.0"])
        .assert()
        .success()
        .stdout("com/example/lib/1.0/lib-1.0.jar\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_of_classified_artifact() {
    TestFixture::new()
        .command()
        .args(["path", "org.acme:core:zip:dist:2.0", "--repo", "central"])
        .assert()
        .success()
        .stdout("org/acme/core/2.0/core-2.0-dist.zip\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_of_timestamped_snapshot() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .args(["path", "com.example:lib:1.0-20240101.120000-3"])
        .assert()
        .success()
        .stdout("com/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar\n");
    fixture
        .command()
        .args(["path", "com.example:lib:1.0-20240101.120000-3", "--repo", "central"])
        .assert()
        .success()
        .stdout("com/example/lib/1.0-SNAPSHOT/lib-1.0-20240101.120000-3.jar\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_of_metadata() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .args([
            "path",
            "--metadata",
            "com.example:lib::maven-metadata.xml",
            "--repo",
            "central",
        ])
        .assert()
        .success()
        .stdout("com/example/lib/maven-metadata-central.xml\n");
    fixture
        .command()
        .args(["path", "--metadata", "com.example:lib::maven-metadata.xml"])
        .assert()
        .success()
        .stdout("com/example/lib/maven-metadata-local.xml\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_with_split_layout() {
    let fixture = TestFixture::new().with_config(configs::SPLIT);
    fixture
        .command_with_config()
        .args(["path", "com.example:lib:1.0"])
        .assert()
        .success()
        .stdout("installed/com/example/lib/1.0/lib-1.0.jar\n");
    fixture
        .command_with_config()
        .args(["path", "com.example:lib:1.0", "--repo", "central"])
        .assert()
        .success()
        .stdout("cached/central/com/example/lib/1.0/lib-1.0.jar\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_define_overrides_config() {
    TestFixture::new()
        .command()
        .args([
            "-D",
            "local-repository.enhanced.split=true",
            "-D",
            "local-repository.enhanced.localPrefix=mine",
            "path",
            "com.example:lib:1.0",
        ])
        .assert()
        .success()
        .stdout("mine/com/example/lib/1.0/lib-1.0.jar\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_simple_type_ignores_split() {
    TestFixture::new()
        .command()
        .args([
            "--type",
            "simple",
            "-D",
            "local-repository.enhanced.split=true",
            "path",
            "com.example:lib:1.0",
        ])
        .assert()
        .success()
        .stdout("com/example/lib/1.0/lib-1.0.jar\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_absolute() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .args(["path", "--absolute", "g:a:1"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("g/a/1/a-1.jar\n"))
        .stdout(predicate::str::contains("repo"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_invalid_coordinate() {
    TestFixture::new()
        .command()
        .args(["path", "not-a-coordinate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse artifact coordinate"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_unknown_repository_type() {
    TestFixture::new()
        .command()
        .args(["--type", "odd", "path", "g:a:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open local repository"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_invalid_config_file() {
    let fixture = TestFixture::new().with_config(configs::INVALID_YAML);
    fixture
        .command_with_config()
        .args(["path", "g:a:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_path_invalid_flag_value() {
    TestFixture::new()
        .command()
        .args(["-D", "local-repository.enhanced.split=maybe", "path", "g:a:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a boolean"));
}

//! End-to-end tests for the `local-repo tracking` command.
//!
//! Run with:
//! cargo test --features integration-tests --test cli_e2e_tracking

mod common;
use common::prelude::*;

const JAR: &str = "com/example/lib/1.0/lib-1.0.jar";
const POM: &str = "com/example/lib/1.0/lib-1.0.pom";

fn registered_fixture() -> TestFixture {
    let fixture = TestFixture::new().with_file(JAR, "jar").with_file(POM, "pom");
    fixture
        .command()
        .args(["add", "com.example:lib:1.0", "--repo", "central"])
        .assert()
        .success();
    fixture
        .command()
        .args(["add", "com.example:lib:pom:1.0"])
        .assert()
        .success();
    fixture
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_help() {
    TestFixture::new()
        .command()
        .args(["tracking", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_show() {
    let fixture = registered_fixture();
    fixture
        .command()
        .args(["tracking", "show", "com/example/lib/1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib-1.0.jar: central"))
        .stdout(predicate::str::contains("lib-1.0.pom: (local install)"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_show_json() {
    let fixture = registered_fixture();
    let output = fixture
        .command()
        .args(["tracking", "show", "com/example/lib/1.0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let files: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(files["lib-1.0.jar"], serde_json::json!(["central"]));
    assert_eq!(files["lib-1.0.pom"], serde_json::json!([""]));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_show_missing_directory() {
    TestFixture::new()
        .command()
        .args(["tracking", "show", "com/example/none/1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracking file at"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_list() {
    let fixture = registered_fixture();
    fixture.place("org/acme/core/2.0/core-2.0.jar", "jar");
    fixture
        .command()
        .args(["add", "org.acme:core:2.0"])
        .assert()
        .success();

    fixture
        .command()
        .args(["tracking", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com/example/lib/1.0  2 file(s), 2 entries"))
        .stdout(predicate::str::contains("org/acme/core/2.0  1 file(s), 1 entry"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_list_empty_repository() {
    TestFixture::new()
        .command()
        .args(["tracking", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracking files found"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_tracking_reset_makes_files_untracked() {
    let fixture = registered_fixture();
    fixture
        .command()
        .args(["find", "com.example:lib:1.0", "--repo", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not available"));

    fixture
        .command()
        .args(["tracking", "reset", "com/example/lib/1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));
    fixture
        .child("com/example/lib/1.0/_remote.repositories")
        .assert(predicate::path::missing());

    fixture
        .command()
        .args(["find", "com.example:lib:1.0", "--repo", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("available from local"));

    fixture
        .command()
        .args(["tracking", "reset", "com/example/lib/1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracking file at"));
}

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_jdocfix")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).unwrap()
}

/// Copy a fixture into `dir` at `rel` and return the full path.
fn stage(dir: &Path, name: &str, rel: &str) -> PathBuf {
    let target = dir.join(rel);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::copy(fixture_path(name), &target).unwrap();
    target
}

// -- in-place fixing --

#[test]
fn fixes_missing_and_incomplete_comments() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Account.java", "src/com/acme/Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--default-author", "jane", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) scanned, 1 changed, 0 failed"));

    assert_eq!(fs::read_to_string(&file).unwrap(), fixture("Account.expected.java"));
}

#[test]
fn second_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Account.expected.java", "src/com/acme/Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--default-author", "jane", "src/com/acme/Account.java"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) scanned, 0 changed, 0 failed"));

    assert_eq!(fs::read_to_string(&file).unwrap(), fixture("Account.expected.java"));
}

#[test]
fn throws_and_params_are_reconciled() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Io.java", "Io.java");

    cmd()
        .current_dir(dir.path())
        .args(["--no-class-comment", "--fix-tags", "param,return,throws", "Io.java"])
        .assert()
        .success()
        .stderr(predicate::str::contains("NoSuchThing"));

    assert_eq!(fs::read_to_string(&file).unwrap(), fixture("Io.expected.java"));
}

#[test]
fn unknown_throws_can_be_removed() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Io.java", "Io.java");

    cmd()
        .current_dir(dir.path())
        .args([
            "--no-class-comment",
            "--fix-tags",
            "param,return,throws",
            "--remove-unknown-throws",
            "Io.java",
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&file).unwrap();
    assert!(!text.contains("NoSuchThing"));
    assert!(text.contains("     * @throws java.lang.IllegalStateException\n     */"));
}

#[test]
fn inherited_method_across_files() {
    let dir = TempDir::new().unwrap();
    let shape = stage(dir.path(), "Shape.java", "geo/Shape.java");
    let circle = stage(dir.path(), "Circle.java", "geo/Circle.java");

    cmd()
        .current_dir(dir.path())
        .args(["--fix-tags", "param,return,throws", "geo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s) scanned, 1 changed, 0 failed"));

    assert_eq!(fs::read_to_string(&circle).unwrap(), fixture("Circle.expected.java"));
    assert_eq!(fs::read_to_string(&shape).unwrap(), fixture("Shape.java"));
}

#[test]
fn api_diff_limits_since_to_new_methods() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Api.java", "Api.java");

    cmd()
        .current_dir(dir.path())
        .args(["--default-author", "jane", "--api-diff"])
        .arg(fixture_path("clirr.txt"))
        .arg("Api.java")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&file).unwrap(), fixture("Api.expected.java"));
}

#[test]
fn level_public_skips_protected_members() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Circle.java", "Circle.java");
    let original = fixture("Circle.java");
    let edited = original.replace("     * @param factor the factor\n", "     * @param factor\n");
    fs::write(&file, &edited).unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["--level", "public", "--fix-tags", "param", "Circle.java"])
        .assert()
        .success();

    assert!(fs::read_to_string(&file).unwrap().contains("     * @param factor\n     */"));
}

// -- output modes --

#[test]
fn dry_run_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    let file = stage(dir.path(), "Account.java", "Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--dry-run", "Account.java"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would fix Account.java"))
        .stdout(predicate::str::contains("1 file(s) scanned, 1 changed, 0 failed"));

    assert_eq!(fs::read_to_string(&file).unwrap(), fixture("Account.java"));
}

#[test]
fn check_fails_when_something_would_change() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), "Account.java", "Account.java");
    stage(dir.path(), "Account.expected.java", "clean/Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--check", "Account.java"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("would fix Account.java"));

    cmd()
        .current_dir(dir.path())
        .args(["--check", "--default-author", "jane", "clean/Account.java"])
        .assert()
        .success();
}

#[test]
fn output_directory_mirrors_input_paths() {
    let dir = TempDir::new().unwrap();
    let input = stage(dir.path(), "Account.java", "src/com/acme/Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--default-author", "jane", "-o", "out", "src/com/acme/Account.java"])
        .assert()
        .success();

    let written = dir.path().join("out/src/com/acme/Account.java");
    assert_eq!(fs::read_to_string(written).unwrap(), fixture("Account.expected.java"));
    assert_eq!(fs::read_to_string(&input).unwrap(), fixture("Account.java"));
}

// -- inputs and failures --

#[test]
fn excluded_files_are_not_scanned() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), "Account.java", "src/Account.java");
    let skipped = stage(dir.path(), "Io.java", "src/gen/Io.java");

    cmd()
        .current_dir(dir.path())
        .args(["--exclude", "**/gen/**", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) scanned"));

    assert_eq!(fs::read_to_string(skipped).unwrap(), fixture("Io.java"));
}

#[test]
fn syntax_errors_skip_the_file() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), "Broken.java", "Broken.java");
    let good = stage(dir.path(), "Account.java", "Account.java");

    cmd()
        .current_dir(dir.path())
        .args(["--default-author", "jane", "Broken.java", "Account.java"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: skipping Broken.java"))
        .stdout(predicate::str::contains("2 file(s) scanned, 1 changed, 1 failed"));

    assert_eq!(fs::read_to_string(good).unwrap(), fixture("Account.expected.java"));
}

#[test]
fn all_files_failing_is_an_error() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), "Broken.java", "Broken.java");

    cmd()
        .current_dir(dir.path())
        .arg("Broken.java")
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 file(s) scanned, 0 changed, 1 failed"));
}

#[test]
fn unmatched_pattern_warns() {
    let dir = TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("nothing/*.java")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: no files matched"))
        .stdout(predicate::str::contains("0 file(s) scanned"));
}

#[test]
fn missing_arguments_fail() {
    cmd().assert().failure();
}

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("videogen")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn urls_conflict_with_script_file() {
    Command::cargo_bin("videogen")
        .unwrap()
        .args([
            "generate",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "--script-file",
            "script.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("videogen")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("videogen"));
}

use std::path::{Path, PathBuf};

use snapbox::cmd::{cargo_bin, Command};

fn fixture() -> &'static Path {
    vival::cargo_bin!("vival-fixture")
}

fn tests_file(dir: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("tests.txt");
    std::fs::write(&path, text).unwrap();
    path
}

fn vival(tests: &Path) -> Command {
    Command::new(cargo_bin("vival"))
        .arg("-t")
        .arg(tests)
        .arg(fixture())
}

fn stdout_of(cmd: Command, code: i32) -> String {
    let assert = cmd.assert().code(code);
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn passing_tests() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(
        &dir,
        "DESCRIPTION /{Echo fixture}/
CMD /{echo}/ INPUT /{1 2}/ OUTPUT /{1 2}/
CMD /{args a b}/ INPUT /{}/ OUTPUT /{a\nb\n}/
",
    );
    vival(&tests)
        .assert()
        .success()
        .stdout_eq("\nEcho fixture\n\nPassed tests: 2/2\n");
}

#[test]
fn wrong_output() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(
        &dir,
        "COMMENT /{off by one}/ CMD /{echo}/ INPUT /{1 2}/ OUTPUT /{1 3}/
CMD /{echo}/ INPUT /{4}/ OUTPUT /{4}/
",
    );
    let stdout = stdout_of(vival(&tests), 1);
    assert!(
        stdout.contains("No description was provided for these tests."),
        "{stdout}"
    );
    assert!(stdout.contains("Failed on these tests:"), "{stdout}");
    assert!(stdout.contains("Test 1: wrong output\noff by one\n"), "{stdout}");
    assert!(stdout.contains("\nPROGRAM OUTPUT:\n1 2\n"), "{stdout}");
    assert!(!stdout.contains("Test 2"), "{stdout}");
    assert!(stdout.ends_with("Passed tests: 1/2\n"), "{stdout}");
}

#[test]
fn ntests_limits_reports() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(
        &dir,
        "CMD /{echo}/ INPUT /{1}/ OUTPUT /{x}/
CMD /{echo}/ INPUT /{2}/ OUTPUT /{y}/
",
    );
    let stdout = stdout_of(vival(&tests).arg("--ntests").arg("1"), 1);
    assert!(stdout.contains("Test 1: wrong output"), "{stdout}");
    assert!(!stdout.contains("Test 2: wrong output"), "{stdout}");
    assert!(stdout.ends_with("Passed tests: 0/2\n"), "{stdout}");
}

#[test]
fn break_fail_stops_early() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(
        &dir,
        "CMD /{echo}/ INPUT /{1}/ OUTPUT /{x}/
CMD /{echo}/ INPUT /{2}/ OUTPUT /{2}/
",
    );
    let stdout = stdout_of(vival(&tests).arg("--break-fail").arg("1"), 1);
    assert!(stdout.ends_with("Passed tests: 0/1\n"), "{stdout}");
}

#[test]
fn parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(&dir, "INPUT /{1 2\n");
    vival(&tests).assert().failure().stdout_eq(
        "Parse failed!\nWrong format! Unmatched number of /{ and }/ brackets (1 opening, 0 closing).\n",
    );
}

#[test]
fn timeout() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(&dir, "CMD /{sleep=10}/ INPUT /{}/ OUTPUT /{}/");
    let stdout = stdout_of(vival(&tests).arg("--timeout").arg("300ms"), 1);
    assert!(stdout.contains("Test 1: time limit exceeded"), "{stdout}");
    assert!(
        stdout.contains("\nPROGRAM OUTPUT:\nTime limit exceeded\n"),
        "{stdout}"
    );
}

#[test]
fn file_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(&dir, "TIMEOUT /{0.3}/ CMD /{sleep=10}/ INPUT /{}/ OUTPUT /{}/");
    let stdout = stdout_of(vival(&tests), 1);
    assert!(stdout.contains("Test 1: time limit exceeded"), "{stdout}");
}

#[test]
#[cfg(unix)]
fn startup_failure() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let tests = tests_file(
        &dir,
        &format!(
            "STARTUP /{{exit 3}}/ CMD /{{stderr=boom}}/ INPUT /{{}}/ OUTPUT /{{}}/
CMD /{{echo}}/ CLEANUP /{{touch {}}}/ INPUT /{{}}/ OUTPUT /{{}}/
",
            marker.display()
        ),
    );
    let stdout = stdout_of(vival(&tests), 1);
    assert!(
        stdout.contains("Test 1: environment preparation failed at `exit 3`"),
        "{stdout}"
    );
    assert!(
        stdout.contains("Failed to execute: exit 3"),
        "{stdout}"
    );
    assert!(stdout.ends_with("Passed tests: 1/2\n"), "{stdout}");
    assert!(marker.exists());
}

#[test]
fn fill_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(
        &dir,
        "DESCRIPTION /{Incrementing}/
CMD /{increment}/ INPUT /{1 2}/
CMD /{increment}/ INPUT /{-1}/ OUTPUT /{7}/
",
    );
    let output = dir.path().join("filled.txt");
    let stdout = stdout_of(
        vival(&tests).arg("-m").arg("fill").arg("-o").arg(&output),
        0,
    );
    assert!(stdout.ends_with("Filled tests: 1/1\n"), "{stdout}");

    let filled = std::fs::read_to_string(&output).unwrap();
    let registry = vival::format::TagRegistry::new();
    let suite = vival::format::Parser::new(&registry)
        .parse(&filled)
        .unwrap();
    assert_eq!(suite.description(), "Incrementing");
    assert_eq!(suite.tests.len(), 2);
    assert_eq!(suite.tests[0].merged(vival::format::Tag::Output), "2 3\n");
    assert_eq!(suite.tests[1].merged(vival::format::Tag::Output), "7");
}

#[test]
fn old_format() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(&dir, "[INPUT]\necho\n{CMD}\n1 2\n[OUTPUT]\n1 2\n");
    let stdout = stdout_of(vival(&tests).arg("--old-format"), 0);
    assert!(stdout.ends_with("Passed tests: 1/1\n"), "{stdout}");
}

#[test]
fn unknown_tag_config() {
    let dir = tempfile::tempdir().unwrap();
    let tests = tests_file(&dir, "INPUT /{}/");
    let tags = dir.path().join("tags.toml");
    std::fs::write(&tags, "[NOPE]\norder = 1\n").unwrap();
    vival(&tests).arg("--tags").arg(&tags).assert().failure();
}

#[test]
fn missing_executable() {
    Command::new(cargo_bin("vival"))
        .arg("does/not/exist")
        .assert()
        .failure();
}

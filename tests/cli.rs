use assert_cmd::Command;

#[test]
fn help_describes_flags() {
    let assert = Command::cargo_bin("typesprint")
        .unwrap()
        .arg("--help")
        .assert()
        .success();

    let out = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(out.contains("--corpus"));
    assert!(out.contains("--db"));
    assert!(out.contains("--top"));
}

#[test]
fn refuses_to_run_without_a_tty() {
    let assert = Command::cargo_bin("typesprint")
        .unwrap()
        .write_stdin("")
        .assert()
        .failure();

    let err = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(err.contains("stdin must be a tty"));
}

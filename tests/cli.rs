use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cnav() -> Command {
    Command::cargo_bin("cnav").unwrap()
}

#[test]
fn test_help_lists_options() {
    cnav()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--backend-url"))
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version() {
    cnav()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_writes_config_once() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("code-navigator").join("config.toml");

    cnav()
        .env("XDG_CONFIG_HOME", home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing config.toml"));
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("skip_redundant_file_fetch = false"));

    std::fs::write(&config, "# edited\n").unwrap();
    cnav()
        .env("XDG_CONFIG_HOME", home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping config.toml"));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "# edited\n");

    cnav()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["init", "--force"])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&config)
        .unwrap()
        .contains("[keybindings]"));
}

#[test]
fn test_unknown_flag_fails() {
    cnav()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-such-flag"));
}

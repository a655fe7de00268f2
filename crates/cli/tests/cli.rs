use assert_cmd::Command;

#[test]
fn config_prints_resolved_settings() {
    let output = Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("config")
        .env_remove("BOOKSHELF_ENV")
        .env_remove("PORT")
        .env("BOOKSHELF_CONFIG_DIR", "does-not-exist")
        .env("BOOKSHELF_SERVER__PORT", "4321")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("server.port        = 4321"));
    assert!(stdout.contains("server.api_prefix  = /api/v1"));
}

#[test]
fn unknown_environment_fails() {
    Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("config")
        .env("BOOKSHELF_ENV", "qa")
        .env("BOOKSHELF_CONFIG_DIR", "does-not-exist")
        .assert()
        .failure();
}

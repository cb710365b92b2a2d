use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scout(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scout").unwrap();
    cmd.env_clear()
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

#[test]
fn tools_lists_builtin_tools_without_credentials() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("bing_search"))
        .stdout(predicate::str::contains("check_time"))
        .stdout(predicate::str::contains("check_weather"));
}

#[test]
fn question_without_configuration_fails() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .arg("What time is it in Europe/London?")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key"));
}

#[test]
fn missing_weather_key_is_named() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .env("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com")
        .env("AZURE_OPENAI_API_KEY", "key")
        .env("CHAT_DEPLOYMENT", "chat")
        .env("BING_SUBSCRIPTION_KEY", "bing")
        .arg("Will it rain in Paris?")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weather.api_key"))
        .stderr(predicate::str::contains("WEATHER_API_KEY"));
}

#[test]
fn unreadable_config_override_fails() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .args(["--config", "missing.json", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn rust_log_overrides_default_filter() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .arg("tools")
        .assert()
        .success()
        .stderr(predicate::str::contains("Listing available tools"));

    scout(&home)
        .env("RUST_LOG", "warn")
        .arg("tools")
        .assert()
        .success()
        .stderr(predicate::str::contains("Listing available tools").not());
}

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn lanchr(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lanchr"));
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn read_dict(path: &Path) -> plist::Dictionary {
    plist::Value::from_file(path)
        .expect("parse written plist")
        .into_dictionary()
        .expect("top-level dict")
}

#[test]
fn help_lists_every_subcommand() {
    let home = TempDir::new().expect("home");
    let assert = lanchr(home.path()).arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for name in [
        "list", "info", "search", "enable", "disable", "restart", "load", "unload", "doctor",
        "create", "edit", "export", "import",
    ] {
        assert!(stdout.contains(name), "missing {name} in help:\n{stdout}");
    }
}

#[test]
fn completion_scripts_are_generated() {
    let home = TempDir::new().expect("home");
    for shell in ["bash", "zsh", "fish"] {
        let assert = lanchr(home.path())
            .args(["--generate-completion", shell])
            .assert()
            .success();
        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert!(stdout.contains("lanchr"), "{shell}: {stdout}");
        assert!(stdout.contains("doctor"), "{shell}: {stdout}");
    }

    lanchr(home.path())
        .args(["--generate-completion", "powershell"])
        .assert()
        .failure();
}

#[test]
fn completion_flag_is_hidden_from_help() {
    let home = TempDir::new().expect("home");
    lanchr(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("generate-completion").not());
}

#[test]
fn create_applies_template_and_default_logs() {
    let home = TempDir::new().expect("home");
    let out = home.path().join("com.example.tick.plist");

    lanchr(home.path())
        .args(["create", "--label", "com.example.tick", "--program", "/bin/sh"])
        .args(["--template", "interval", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Created"));

    let dict = read_dict(&out);
    assert_eq!(
        dict.get("Label").and_then(|v| v.as_string()),
        Some("com.example.tick")
    );
    assert_eq!(
        dict.get("StartInterval").and_then(|v| v.as_unsigned_integer()),
        Some(300)
    );
    assert_eq!(
        dict.get("StandardOutPath").and_then(|v| v.as_string()),
        Some("/tmp/com.example.tick.stdout.log")
    );
}

#[test]
fn create_flags_override_template() {
    let home = TempDir::new().expect("home");
    let out = home.path().join("job.plist");

    lanchr(home.path())
        .args(["create", "-l", "com.example.job", "-p", "/bin/sh"])
        .args(["--args=-c,echo hi", "--calendar", "30 2", "--keep-alive"])
        .args(["--env", "MODE=prod", "--stdout", "/var/tmp/job.log"])
        .args(["--template", "simple", "-o"])
        .arg(&out)
        .assert()
        .success();

    let dict = read_dict(&out);
    let args: Vec<&str> = dict
        .get("ProgramArguments")
        .and_then(|v| v.as_array())
        .expect("arguments")
        .iter()
        .filter_map(|v| v.as_string())
        .collect();
    assert_eq!(args, vec!["/bin/sh", "-c", "echo hi"]);
    assert_eq!(dict.get("KeepAlive").and_then(|v| v.as_boolean()), Some(true));
    assert_eq!(dict.get("RunAtLoad").and_then(|v| v.as_boolean()), Some(true));

    let calendar = dict
        .get("StartCalendarInterval")
        .and_then(|v| v.as_dictionary())
        .expect("calendar");
    assert_eq!(calendar.get("Minute").and_then(|v| v.as_signed_integer()), Some(30));
    assert_eq!(calendar.get("Hour").and_then(|v| v.as_signed_integer()), Some(2));
    assert!(calendar.get("Day").is_none());

    let env = dict
        .get("EnvironmentVariables")
        .and_then(|v| v.as_dictionary())
        .expect("env");
    assert_eq!(env.get("MODE").and_then(|v| v.as_string()), Some("prod"));
    assert_eq!(
        dict.get("StandardOutPath").and_then(|v| v.as_string()),
        Some("/var/tmp/job.log")
    );
}

#[test]
fn create_defaults_to_user_agents_dir() {
    let home = TempDir::new().expect("home");
    lanchr(home.path())
        .args(["--json", "create", "--label", "com.example.home", "--program", "/bin/sh"])
        .assert()
        .success()
        .stdout(contains("\"action\": \"create\""));

    assert!(home
        .path()
        .join("Library/LaunchAgents/com.example.home.plist")
        .exists());
}

#[test]
fn unknown_template_lists_choices() {
    let home = TempDir::new().expect("home");
    lanchr(home.path())
        .args(["create", "--label", "x", "--program", "/bin/sh", "--template", "nightly"])
        .assert()
        .failure()
        .stderr(contains("simple, interval, calendar, keepalive, watcher"));
}

#[test]
fn create_rejects_missing_binary() {
    let home = TempDir::new().expect("home");
    let out = home.path().join("x.plist");
    lanchr(home.path())
        .args(["create", "--label", "com.example.x", "--program", "/nonexistent/bin/x", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(contains("binary not found"));
    assert!(!out.exists());
}

#[test]
fn create_rejects_bad_calendar() {
    let home = TempDir::new().expect("home");
    lanchr(home.path())
        .args(["create", "--label", "com.example.x", "--program", "/bin/sh"])
        .args(["--calendar", "noon"])
        .assert()
        .failure()
        .stderr(contains("invalid minute: noon"));
}

const BUNDLE: &str = r#"{
  "version": 1,
  "exported_at": "2026-01-02T03:04:05Z",
  "label": "com.example.moved",
  "domain": "user",
  "type": "agent",
  "plist_path": "/Users/someone/Library/LaunchAgents/com.example.moved.plist",
  "plist": {
    "Label": "com.example.moved",
    "Program": "/opt/not/installed/yet",
    "RunAtLoad": true
  }
}
"#;

#[test]
fn import_installs_into_home_and_refuses_overwrite() {
    let home = TempDir::new().expect("home");
    let bundle = home.path().join("bundle.json");
    fs::write(&bundle, BUNDLE).expect("write bundle");

    lanchr(home.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .success()
        .stdout(contains("Imported com.example.moved"));

    let installed = home
        .path()
        .join("Library/LaunchAgents/com.example.moved.plist");
    let dict = read_dict(&installed);
    assert_eq!(
        dict.get("Program").and_then(|v| v.as_string()),
        Some("/opt/not/installed/yet")
    );

    lanchr(home.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn import_rejects_versionless_bundle() {
    let home = TempDir::new().expect("home");
    let bundle = home.path().join("bundle.json");
    fs::write(&bundle, BUNDLE.replace("\"version\": 1", "\"version\": 0")).expect("write");

    lanchr(home.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .failure()
        .stderr(contains("missing version"));
}

#[test]
fn import_refuses_labels_that_escape_agents_dir() {
    let home = TempDir::new().expect("home");
    let bundle = home.path().join("bundle.json");
    fs::write(
        &bundle,
        BUNDLE.replace(
            "\"label\": \"com.example.moved\"",
            "\"label\": \"../../elsewhere/x\"",
        ),
    )
    .expect("write");

    lanchr(home.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .failure()
        .stderr(contains("not a valid file name"));
    assert!(!home.path().join("elsewhere/x.plist").exists());
}

#[cfg(not(target_os = "macos"))]
#[test]
fn service_commands_need_macos() {
    let home = TempDir::new().expect("home");
    lanchr(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("only supported on macOS"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn edit_needs_macos_before_opening_an_editor() {
    let home = TempDir::new().expect("home");
    let marker = home.path().join("editor-ran");
    lanchr(home.path())
        .args(["edit", "com.example.any"])
        .env("VISUAL", format!("touch {}", marker.display()))
        .assert()
        .failure()
        .stderr(contains("only supported on macOS"));
    assert!(!marker.exists());
}

//! Decoding real-world descriptor shapes from disk.

use std::fs;

use lanchr_core::KeepAlive;
use lanchr_plist::{parse, write, Descriptor, PlistError, Template, Validation};
use rstest::rstest;
use tempfile::TempDir;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
"#;

fn write_plist(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("{HEADER}{body}\n</plist>\n")).expect("write fixture");
    path
}

#[test]
fn decodes_conditional_keep_alive_and_calendar_array() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_plist(
        &dir,
        "com.example.sync.plist",
        r#"<dict>
  <key>Label</key><string>com.example.sync</string>
  <key>ProgramArguments</key>
  <array><string>/usr/local/bin/sync</string><string>--once</string></array>
  <key>KeepAlive</key>
  <dict>
    <key>SuccessfulExit</key><false/>
    <key>OtherJobEnabled</key><dict><key>com.example.db</key><true/></dict>
  </dict>
  <key>StartCalendarInterval</key>
  <array>
    <dict><key>Hour</key><integer>3</integer><key>Minute</key><integer>15</integer></dict>
    <dict><key>Weekday</key><integer>0</integer></dict>
  </array>
  <key>ExitTimeOut</key><integer>30</integer>
  <key>Nice</key><integer>-5</integer>
  <key>MachServices</key><dict><key>com.example.sync.xpc</key><true/></dict>
  <key>SomeFutureKey</key><string>ignored</string>
</dict>"#,
    );

    let descriptor = parse(&path).expect("parse");
    assert_eq!(descriptor.label(), Some("com.example.sync"));
    assert_eq!(descriptor.program_path(), Some("/usr/local/bin/sync"));
    assert_eq!(descriptor.exit_timeout, Some(30));
    assert_eq!(descriptor.nice, Some(-5));
    assert!(descriptor.mach_services.contains_key("com.example.sync.xpc"));

    match descriptor.keep_alive {
        Some(KeepAlive::Conditional(ref conditions)) => {
            assert_eq!(conditions.successful_exit, Some(false));
            assert_eq!(conditions.other_job_enabled.get("com.example.db"), Some(&true));
        }
        ref other => panic!("expected conditional keep-alive, got {other:?}"),
    }

    let intervals = descriptor
        .start_calendar_interval
        .as_ref()
        .expect("calendar")
        .intervals();
    assert_eq!(intervals.len(), 2);
    assert_eq!(intervals[0].hour, Some(3));
    assert_eq!(intervals[1].weekday, Some(0));
}

#[rstest]
#[case("<dict><key>KeepAlive</key><true/></dict>", Some(KeepAlive::Simple(true)))]
#[case("<dict><key>KeepAlive</key><false/></dict>", Some(KeepAlive::Simple(false)))]
#[case("<dict/>", None)]
fn decodes_simple_keep_alive(#[case] body: &str, #[case] expected: Option<KeepAlive>) {
    let dir = TempDir::new().expect("tempdir");
    let path = write_plist(&dir, "k.plist", body);
    assert_eq!(parse(&path).expect("parse").keep_alive, expected);
}

#[test]
fn missing_label_decodes_as_none() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_plist(
        &dir,
        "unlabelled.plist",
        "<dict><key>Program</key><string>/bin/sh</string></dict>",
    );
    let descriptor = parse(&path).expect("parse");
    assert_eq!(descriptor.label(), None);
}

#[test]
fn garbage_is_a_decode_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.plist");
    fs::write(&path, b"this is not a property list").expect("write");

    let err = parse(&path).unwrap_err();
    assert!(matches!(err, PlistError::Decode { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.plist"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = parse(&dir.path().join("absent.plist")).unwrap_err();
    assert!(matches!(err, PlistError::Io { .. }), "got: {err}");
}

#[test]
fn template_output_survives_write_and_parse() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("com.example.keep.plist");
    let descriptor = Descriptor {
        label: Some("com.example.keep".into()),
        program: Some("/bin/sh".into()),
        ..Template::KeepAlive.descriptor()
    };

    write(&descriptor, &path, Validation::LabelOnly).expect("write");
    let parsed = parse(&path).expect("parse");
    assert!(parsed.run_at_load);
    assert_eq!(parsed.keep_alive, descriptor.keep_alive);
}

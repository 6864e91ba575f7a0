//! Integration tests for the keygate binary
//!
//! Devices come from JSON fixtures so the tests do not depend on the host's
//! block devices.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const TESTDISK: &str = r#"[
    {"DeviceID": "/dev/sda1", "VolumeName": "SYSTEM", "VolumeSerialNumber": "11111111", "FileSystem": "ntfs"},
    {"DeviceID": "/dev/sdb1", "VolumeName": "TESTDISK", "VolumeSerialNumber": "42E7D729", "FileSystem": "vfat"}
]"#;

fn fixture(devices: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("devices.json"), devices).unwrap();
    dir
}

fn keygate(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keygate"))
        .arg("--devices-file")
        .arg(dir.join("devices.json"))
        .args(args)
        // Keep a user config from leaking into the tests
        .env("KEYGATE_CONFIG", dir.join("absent-config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run keygate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_default_run_authenticates() {
    let dir = fixture(TESTDISK);
    let output = keygate(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Authentication succeeded"));
}

#[test]
fn test_wrong_seed_rejected() {
    let dir = fixture(TESTDISK);
    let output = keygate(dir.path(), &["auth", "--seed", "00000000"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!stdout(&output).contains("Authentication succeeded"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("rejected"));
}

#[test]
fn test_missing_drive_rejected() {
    let dir = fixture("[]");
    let output = keygate(dir.path(), &["auth"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!stdout(&output).contains("Authentication succeeded"));
}

#[test]
fn test_missing_serial_is_error() {
    let dir = fixture(r#"[{"VolumeName": "TESTDISK"}]"#);
    let output = keygate(dir.path(), &["auth"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unreadable_device_list_is_error() {
    let dir = fixture("not json");
    let output = keygate(dir.path(), &["auth"]);

    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_protected_command_runs() {
    let dir = fixture(TESTDISK);
    let marker = dir.path().join("unlocked");
    let output = keygate(
        dir.path(),
        &["auth", "--", "touch", marker.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(marker.exists());
}

#[cfg(unix)]
#[test]
fn test_protected_command_skipped_on_rejection() {
    let dir = fixture(TESTDISK);
    let marker = dir.path().join("unlocked");
    let output = keygate(
        dir.path(),
        &["auth", "--seed", "00000000", "--", "touch", marker.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(!marker.exists());
}

#[test]
fn test_list_and_check() {
    let dir = fixture(TESTDISK);

    let list = keygate(dir.path(), &["list"]);
    assert_eq!(list.status.code(), Some(0));
    let out = stdout(&list);
    assert!(out.contains("/dev/sda1"));
    assert!(out.contains("TESTDISK"));

    let filtered = stdout(&keygate(dir.path(), &["list", "--label", "SYSTEM"]));
    assert!(filtered.contains("/dev/sda1"));
    assert!(!filtered.contains("/dev/sdb1"));

    assert_eq!(
        keygate(dir.path(), &["check", "--label", "TESTDISK"]).status.code(),
        Some(0)
    );
    assert_eq!(
        keygate(dir.path(), &["check", "--label", "NOPE"]).status.code(),
        Some(2)
    );
}

#[test]
fn test_fingerprint_command() {
    let dir = fixture("[]");
    let output = keygate(dir.path(), &["fingerprint", "abc"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "900150983CD24FB0D6963F7D28E17F72");
}

#[test]
fn test_relative_xdg_config_home_is_ignored() {
    let dir = fixture(TESTDISK);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    // A config in the working directory that would reject the real drive
    let planted = dir.path().join("keygate");
    std::fs::create_dir_all(&planted).unwrap();
    std::fs::write(planted.join("config.json"), r#"{"expected_seed": "DEADBEEF"}"#).unwrap();
    let nested = dir.path().join("rel").join("keygate");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("config.json"), r#"{"expected_seed": "DEADBEEF"}"#).unwrap();

    for xdg in ["", "rel"] {
        let output = Command::new(env!("CARGO_BIN_EXE_keygate"))
            .current_dir(dir.path())
            .arg("--devices-file")
            .arg(dir.path().join("devices.json"))
            .env_remove("KEYGATE_CONFIG")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", xdg)
            .env("HOME", &home)
            .output()
            .expect("failed to run keygate");

        assert_eq!(output.status.code(), Some(0), "XDG_CONFIG_HOME={:?}", xdg);
        assert!(stdout(&output).contains("Authentication succeeded"));
    }
}

#[cfg(unix)]
#[test]
fn test_failing_protected_command_is_error() {
    let dir = fixture(TESTDISK);
    let output = keygate(dir.path(), &["auth", "--", "sh", "-c", "exit 4"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_list_json_feeds_devices_file() {
    let dir = fixture(TESTDISK);
    let list = keygate(dir.path(), &["list", "--json"]);
    assert_eq!(list.status.code(), Some(0));

    let devices: Vec<std::collections::BTreeMap<String, String>> =
        serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1]["VolumeName"], "TESTDISK");
    assert_eq!(devices[1]["DeviceID"], "/dev/sdb1");

    // The listing is itself a valid device list
    let copy = fixture(&String::from_utf8_lossy(&list.stdout));
    assert_eq!(keygate(copy.path(), &["auth"]).status.code(), Some(0));
}

#[test]
fn test_auth_help_warns_about_file_sources() {
    let dir = fixture("[]");
    let output = keygate(dir.path(), &["auth", "--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("not as a security boundary"));
}

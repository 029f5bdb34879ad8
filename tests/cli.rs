use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_font(dir: &Path) -> PathBuf {
    let fixture =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf");
    let font = dir.join("digital-mono.ttf");
    fs::copy(&fixture, &font).expect("copy font fixture");
    font
}

#[test]
fn diagnostics_reports_loaded_config() {
    let dir = tempdir().expect("tempdir");
    let font = write_font(dir.path());
    let config = dir.path().join("cclock.ini");
    fs::write(&config, "x=40\ny=-20\nclockScale=2.5\nshadow=1\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--config")
        .arg(&config)
        .arg("--font")
        .arg(&font)
        .assert()
        .success()
        .stdout(predicate::str::contains("(loaded)"))
        .stdout(predicate::str::contains("clockScale=2.5"))
        .stdout(predicate::str::contains("y=-20"))
        .stdout(predicate::str::contains("- CClock"))
        .stdout(predicate::str::contains("Benchmark summary"));
}

#[test]
fn diagnostics_with_missing_config_uses_defaults_without_creating_it() {
    let dir = tempdir().expect("tempdir");
    let font = write_font(dir.path());
    let config = dir.path().join("cclock.ini");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--config")
        .arg(&config)
        .arg("--font")
        .arg(&font)
        .assert()
        .success()
        .stdout(predicate::str::contains("missing, defaults"))
        .stdout(predicate::str::contains("x=100"))
        .stdout(predicate::str::contains("shadow=1"));

    assert!(!config.exists());
}

#[test]
fn no_shadow_flag_overrides_config() {
    let dir = tempdir().expect("tempdir");
    let font = write_font(dir.path());
    let config = dir.path().join("cclock.ini");
    fs::write(&config, "shadow=1\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--no-shadow")
        .arg("--config")
        .arg(&config)
        .arg("--font")
        .arg(&font)
        .assert()
        .success()
        .stdout(predicate::str::contains("shadow=0"));

    assert_eq!(fs::read_to_string(&config).expect("read config"), "shadow=1\n");
}

#[test]
fn missing_font_fails_with_clear_error() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--font")
        .arg(dir.path().join("absent.ttf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read font"));
}

#[test]
fn empty_font_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let font = dir.path().join("empty.ttf");
    fs::write(&font, b"").expect("write font");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--font")
        .arg(&font)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn junk_font_is_rejected_before_the_window_opens() {
    let dir = tempdir().expect("tempdir");
    let font = dir.path().join("junk.ttf");
    fs::write(&font, b"\x00\x01\x00\x00font").expect("write font");

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--font")
        .arg(&font)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: font file"))
        .stderr(predicate::str::contains("is not a usable TTF/OTF font"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn zero_fps_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let font = write_font(dir.path());

    let mut cmd = cargo_bin_cmd!("cclock");
    cmd.arg("--diagnostics")
        .arg("--fps")
        .arg("0")
        .arg("--font")
        .arg(&font)
        .assert()
        .failure()
        .stderr(predicate::str::contains("frame rate must be greater than zero"));
}

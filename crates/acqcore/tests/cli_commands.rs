#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn acqcore() -> Command {
    Command::new(env!("CARGO_BIN_EXE_acqcore"))
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/acqcore-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

#[test]
fn version_prints_crate_version() {
    let output = acqcore()
        .arg("version")
        .output()
        .expect("version command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("acqcore"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn snap_writes_raw_image_file() {
    let dir = unique_temp_dir("snap");
    let image_path = dir.join("image.raw");

    let output = acqcore()
        .args(["snap", "--width", "32", "--height", "16", "--output"])
        .arg(&image_path)
        .output()
        .expect("snap command should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let image = std::fs::read(&image_path).expect("image file should exist");
    assert_eq!(image.len(), 32 * 16);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_finite_emits_ordered_json_frames() {
    let output = acqcore()
        .args([
            "run", "--count", "3", "--format", "json", "--width", "32", "--height", "16",
        ])
        .output()
        .expect("run command should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let frames: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();

    assert_eq!(frames.len(), 3);
    for (expected, frame) in frames.iter().enumerate() {
        assert_eq!(frame["frame_number"], expected as u64);
        assert_eq!(frame["width"], 32);
        assert_eq!(frame["height"], 16);
    }
}

#[test]
fn run_halts_with_error_on_overflow() {
    // Two 1 KiB buffer slots against a zero-interval producer: the run
    // halts on overflow long before 200 frames are out.
    let output = acqcore()
        .args([
            "run",
            "--count",
            "200",
            "--stop-on-overflow",
            "--width",
            "32",
            "--height",
            "32",
            "--footprint",
            "2048",
            "--format",
            "json",
        ])
        .output()
        .expect("run command should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overflow"), "stderr: {stderr}");
}

#[test]
fn run_without_count_or_continuous_is_usage_error() {
    let output = acqcore()
        .arg("run")
        .output()
        .expect("run command should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--count") || stderr.contains("--continuous"));
}

#[test]
fn bad_interval_is_usage_error() {
    let output = acqcore()
        .args(["run", "--count", "1", "--interval", "fast"])
        .output()
        .expect("run command should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn footprint_too_small_is_usage_error() {
    // 10 bytes cannot hold one 640x480 image.
    let output = acqcore()
        .args(["info", "--footprint", "10"])
        .output()
        .expect("info command should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn info_json_reports_buffer_capacity() {
    let output = acqcore()
        .args([
            "info",
            "--format",
            "json",
            "--width",
            "100",
            "--height",
            "100",
            "--footprint",
            "100000",
        ])
        .output()
        .expect("info command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let info: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("info output should be JSON");

    assert_eq!(info["image_bytes"], 100 * 100);
    assert_eq!(info["buffer_capacity"], 10);
}

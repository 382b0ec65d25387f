//! CLI end-to-end tests
//!
//! Tests for the formatfusion command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the formatfusion binary
#[allow(deprecated)]
fn formatfusion_cmd() -> Command {
    Command::cargo_bin("formatfusion").unwrap()
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = formatfusion_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = formatfusion_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("formatfusion"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = formatfusion_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("formatfusion "));
}

#[test]
fn test_cli_formats_command() {
    let mut cmd = formatfusion_cmd();
    cmd.arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("image"))
        .stdout(predicate::str::contains("png, jpg, jpeg, tiff, tif, bmp, webp"))
        .stdout(predicate::str::contains("mp3, wav, ogg, flac, m4a"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = formatfusion_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = formatfusion_cmd();
    cmd.args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the HTTP server"));
}

#[test]
fn test_cli_convert_png_to_jpg() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("Poster.PNG");
    write_png(&input, 12, 7);

    let mut cmd = formatfusion_cmd();
    cmd.arg("convert")
        .arg(&input)
        .args(["--to", "jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Poster.jpg"));

    let output = dir.path().join("Poster.jpg");
    let decoded = image::open(&output).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 7));
}

#[test]
fn test_cli_convert_to_explicit_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("a.png");
    write_png(&input, 2, 2);
    let output = dir.path().join("nested-name.webp");

    let mut cmd = formatfusion_cmd();
    cmd.arg("convert")
        .arg(&input)
        .args(["--to", "webp", "--output"])
        .arg(&output)
        .assert()
        .success();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::WebP
    );
}

#[test]
fn test_cli_convert_unsupported_target() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("a.png");
    write_png(&input, 2, 2);

    let mut cmd = formatfusion_cmd();
    cmd.arg("convert")
        .arg(&input)
        .args(["--to", "gif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported image format"));
}

#[test]
fn test_cli_convert_refuses_to_overwrite_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("same.png");
    write_png(&input, 2, 2);
    let before = fs::read(&input).unwrap();

    let mut cmd = formatfusion_cmd();
    cmd.arg("convert")
        .arg(&input)
        .args(["--to", "png"])
        .assert()
        .failure();

    assert_eq!(fs::read(&input).unwrap(), before);
}

#[test]
fn test_cli_convert_nonexistent_file() {
    let mut cmd = formatfusion_cmd();
    cmd.args(["convert", "/nonexistent/file.png", "--to", "bmp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_convert_unknown_extension_needs_kind() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "hello").unwrap();

    let mut cmd = formatfusion_cmd();
    cmd.arg("convert")
        .arg(&input)
        .args(["--to", "png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--kind"));
}

#[test]
fn test_cli_inspect_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("a.png");
    write_png(&input, 9, 4);

    let mut cmd = formatfusion_cmd();
    let output = cmd
        .arg("inspect")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["width"], 9);
    assert_eq!(json["height"], 4);
    assert_eq!(json["format"], "png");
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[server]\nport = 9090\nmax_upload_mb = 10\n").unwrap();

    let mut cmd = formatfusion_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("9090"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[server]\nport = 0\n").unwrap();

    let mut cmd = formatfusion_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

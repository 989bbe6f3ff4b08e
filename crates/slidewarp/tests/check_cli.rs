use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn slidewarp(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_slidewarp"));
    command
        .env_remove("SLIDEWARP_CONFIG")
        .env("SLIDEWARP_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn check_reads_discovered_config() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("slidewarp.toml"),
        r#"
version = 1
images = ["first.png", "second.png", "third.png"]
start_at = 1

[blend]
distortion_strength = 0.12

[window]
size = "960x540"
"#,
    )
    .unwrap();

    let output = slidewarp(root.path())
        .args(["--check", "--sensitivity", "2"])
        .output()
        .expect("failed to run slidewarp --check");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("images:      3"), "{stdout}");
    assert!(stdout.contains("960x540"), "{stdout}");
    assert!(stdout.contains("sensitivity=2"), "{stdout}");
    assert!(stdout.contains("strength=0.12"), "{stdout}");
    assert!(stdout.contains("* 1"), "{stdout}");
}

#[test]
fn check_fails_without_images() {
    let root = TempDir::new().unwrap();
    let output = slidewarp(root.path())
        .arg("--check")
        .output()
        .expect("failed to run slidewarp --check");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no images"), "{stderr}");
}

#[test]
fn explicit_config_must_exist() {
    let root = TempDir::new().unwrap();
    let output = slidewarp(root.path())
        .args(["--check", "a.png", "--config"])
        .arg(root.path().join("missing.toml"))
        .output()
        .expect("failed to run slidewarp --check");

    assert!(!output.status.success());
}

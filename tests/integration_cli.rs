// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the command line.
//!
//! Parses realistic argument patterns and runs the built binary for exit
//! codes and error output.

use clap::Parser;
use evermod::cli::{Cli, Command};
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Output};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Run the binary in `cwd` with a private key path that does not exist.
fn evermod(cwd: &Path, args: &[&str]) -> Output {
    Process::new(env!("CARGO_BIN_EXE_evermod"))
        .args(args)
        .current_dir(cwd)
        .env("EVERMOD_KEYS__PRIVATE_KEY", cwd.join("no-key.pem"))
        .output()
        .expect("failed to run evermod")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn cli_version_alias() {
    let cli = Cli::try_parse_from(["evermod", "-v"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn cli_release_with_globals() {
    let cli = Cli::try_parse_from([
        "evermod",
        "--log-level",
        "4",
        "--set",
        "publish.remote=upstream",
        "release",
        "2.0.0-rc.1",
        "workspace",
        "--publish",
    ])
    .unwrap();

    assert_eq!(cli.global.log_level, Some(4));
    assert_eq!(cli.global.options, ["publish.remote=upstream"]);
    let Some(Command::Release(args)) = cli.command else {
        panic!("expected release command");
    };
    assert_eq!(args.tag.as_str(), "2.0.0-rc.1");
    assert!(args.tag.is_prerelease());
    assert_eq!(args.target, PathBuf::from("workspace"));
    assert!(args.publish);
    assert!(!args.auto);
}

#[test]
fn cli_keygen_options() {
    let cli = Cli::try_parse_from([
        "evermod",
        "keygen",
        "--bits",
        "4096",
        "--public-out",
        "src/auth/keys/evermod_public.pem",
        "--force",
    ])
    .unwrap();
    let Some(Command::Keygen(args)) = cli.command else {
        panic!("expected keygen command");
    };
    assert_eq!(args.bits, 4096);
    assert_eq!(
        args.public_out,
        Some(PathBuf::from("src/auth/keys/evermod_public.pem"))
    );
    assert!(args.force);
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn binary_version() {
    let temp = temp_dir();
    let output = evermod(temp.path(), &["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn binary_release_without_key_fails() {
    let temp = temp_dir();
    let output = evermod(temp.path(), &["release", "1.0.0", "."]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Error: release not authorized"), "{stderr}");
    assert!(stderr.contains("missing private key"), "{stderr}");
    assert!(!temp.path().join("releases").exists());
}

#[test]
fn binary_verify_missing_dir_fails() {
    let temp = temp_dir();
    let output = evermod(temp.path(), &["verify", "releases/9.9.9"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("directory not found"), "{}", stderr(&output));
}

#[test]
fn binary_options_reads_evermod_toml() {
    let temp = temp_dir();
    std::fs::write(
        temp.path().join("evermod.toml"),
        "[publish]\nremote = \"upstream\"\n",
    )
    .unwrap();

    let output = evermod(temp.path(), &["options"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|l| l.starts_with("publish.remote") && l.ends_with("= upstream")),
        "{stdout}"
    );
    assert!(stdout.contains("no-key.pem"), "{stdout}");
}

#[test]
fn binary_set_overrides_file() {
    let temp = temp_dir();
    std::fs::write(
        temp.path().join("evermod.toml"),
        "[tag]\nprefix = \"release-\"\n",
    )
    .unwrap();

    let output = evermod(temp.path(), &["--set", "tag.prefix=v", "options"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|l| l.starts_with("tag.prefix") && l.ends_with("= v")),
        "{stdout}"
    );
}

#[test]
fn binary_bad_set_fails() {
    let temp = temp_dir();
    let output = evermod(temp.path(), &["--set", "noequals", "options"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: "), "{}", stderr(&output));
}

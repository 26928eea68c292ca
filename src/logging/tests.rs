// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};
use tracing::Level;

#[test]
fn test_log_level_range() {
    assert_eq!(LogLevel::new(0).unwrap(), LogLevel::SILENT);
    assert_eq!(LogLevel::new(6).unwrap(), LogLevel::DUMP);
    let err = LogLevel::new(7).unwrap_err();
    assert!(err.to_string().contains("0-6"), "unexpected: {err}");
    assert_eq!(LogLevel::from_u8(9), None);
}

#[test]
fn test_log_level_to_tracing() {
    assert_eq!(LogLevel::SILENT.to_tracing_level(), None);
    assert_eq!(LogLevel::WARN.to_tracing_level(), Some(Level::WARN));
    assert_eq!(LogLevel::DUMP.to_tracing_level(), Some(Level::TRACE));
}

#[test]
fn test_filter_strings_scope_dependencies() {
    let filters: Vec<_> = (0..=6)
        .map(|level| LogLevel::new(level).unwrap().to_filter_string())
        .collect();
    insta::assert_debug_snapshot!(filters, @r#"
    [
        "off",
        "error",
        "warn",
        "warn,evermod=info",
        "warn,evermod=debug",
        "warn,evermod=trace",
        "trace",
    ]
    "#);
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert!(!config.show_target());
}

#[test]
fn test_log_config_builder() {
    let config = LogConfig::builder()
        .with_console_level(LogLevel::DEBUG)
        .maybe_with_log_file(Some("release.log".to_string()))
        .build();
    assert_eq!(u8::from(config.console_level()), 4);
    assert_eq!(config.log_file(), Some("release.log"));
}

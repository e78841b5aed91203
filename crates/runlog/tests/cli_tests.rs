// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI tests for runlog
//!
//! These tests verify argument parsing, flag interactions and running the
//! subcommands against input files.

use std::path::PathBuf;

use clap::Parser;
use runlog::config::{Command, Config, ConfigError};
use runlog::render::{self, RenderError};
use tracing::Level;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("runlog-cli-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).expect("write temp file");
    path
}

// ============================================================================
// Flags
// ============================================================================

#[test]
fn test_verbose_short_flag_v() {
    let config = Config::try_parse_from(["runlog", "-v"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(!config.quiet);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_long_flag() {
    let config = Config::try_parse_from(["runlog", "--quiet"]).expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let config = Config::try_parse_from(["runlog", "-v", "-q"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_verbose_flag_value_syntax_not_supported() {
    let result = Config::try_parse_from(["runlog", "--verbose=true"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

#[test]
fn test_global_flags_after_subcommand() {
    let config = Config::try_parse_from(["runlog", "segment", "--pretty", "-q"])
        .expect("parse should succeed");
    assert!(config.pretty);
    assert!(config.quiet);
    assert_eq!(config.command, Some(Command::Segment { input: None }));
}

#[test]
fn test_image_root_flag() {
    let config = Config::try_parse_from(["runlog", "--image-root", "/srv/img", "format"])
        .expect("parse should succeed");
    assert_eq!(config.image_root(), PathBuf::from("/srv/img"));
    assert_eq!(config.format_options().image_root, "/srv/img");
}

// ============================================================================
// Subcommands
// ============================================================================

#[test]
fn test_subcommands_take_optional_file() {
    let config =
        Config::try_parse_from(["runlog", "report", "payload.json"]).expect("parse should succeed");
    assert_eq!(
        config.command,
        Some(Command::Report {
            input: Some(PathBuf::from("payload.json"))
        })
    );

    let config = Config::try_parse_from(["runlog", "format"]).expect("parse should succeed");
    assert_eq!(config.command, Some(Command::Format { input: None }));
}

#[test]
fn test_unknown_subcommand_rejected() {
    let result = Config::try_parse_from(["runlog", "explode"]);
    assert!(result.is_err());
}

#[test]
fn test_run_missing_file_is_config_error() {
    let config = Config::try_parse_from(["runlog", "segment", "/nonexistent/runlog/input.log"])
        .expect("parse should succeed");
    let command = config.command.clone().expect("command");
    let result = render::run(&config, &command);
    assert!(matches!(
        result,
        Err(RenderError::Config(ConfigError::InputNotFound(_)))
    ));
}

#[test]
fn test_run_segment_from_file() {
    let path = write_temp(
        "segment.log",
        "boot\n==== 测试步骤 2：login ====\n[test_a] a\n开始测试步骤3 结算 的操作\n[test_b] b\n",
    );
    let config = Config::try_parse_from(["runlog", "segment", path.to_str().expect("utf-8 path")])
        .expect("parse should succeed");
    let command = config.command.clone().expect("command");

    let json = render::run(&config, &command).expect("run should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["step_count"], 2);
    assert_eq!(value["method_count"], 2);
    assert_eq!(value["steps"][1]["name"], "结算");

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_run_report_from_file() {
    let path = write_temp(
        "report.json",
        r#"{"data": {"report_data": {"1_x": {"process_name": "x", "product_ids": "5",
            "executions": [{"status": "failed", "log_message": "boom"}]}},
            "selected_packages": ["pkg|5"]}}"#,
    );
    let config = Config::try_parse_from([
        "runlog",
        "--image-root",
        "/img",
        "report",
        path.to_str().expect("utf-8 path"),
    ])
    .expect("parse should succeed");
    let command = config.command.clone().expect("command");

    let json = render::run(&config, &command).expect("run should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["groups"][0]["display_name"], "pkg（ID: 5）");
    assert_eq!(value["totals"]["status"]["failed"], 1);
    assert_eq!(
        value["groups"][0]["test_cases"][0]["executions"][0]["status_label"],
        "失败"
    );

    let _ = std::fs::remove_file(path);
}

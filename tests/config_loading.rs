// tests/config_loading.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::fs;
use std::path::PathBuf;

use inwatch::cli::CliArgs;
use inwatch::config::{
    default_config_path, load_and_validate, load_from_path, locate_config, validate_config,
};
use inwatch::{ConsumptionMode, EventMask, HandlerFailurePolicy, InitFlags, InwatchError};
use tempfile::tempdir;

#[test]
fn full_config_file_parses_and_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Inwatch.toml");
    fs::write(
        &path,
        r#"
[engine]
nonblocking = true
poll_timeout_ms = 250
initial_buffer_bytes = 8192
handler_failures = "swallow"
mode = "drain"

[[watch]]
path = "/tmp/inbox"
events = ["create", "IN_DELETE", "close_write"]

[[watch]]
path = "/tmp/outbox"
events = ["all"]
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert!(cfg.engine.nonblocking);
    assert!(cfg.engine.close_on_exec);
    assert_eq!(cfg.engine.poll_timeout_ms, 250);
    assert_eq!(cfg.engine.initial_buffer_bytes, 8192);
    assert_eq!(cfg.engine.handler_failures, HandlerFailurePolicy::Swallow);
    assert_eq!(cfg.engine.mode, ConsumptionMode::Drain);
    assert_eq!(cfg.engine.init_flags(), InitFlags::NONBLOCK | InitFlags::CLOEXEC);

    assert_eq!(cfg.watches.len(), 2);
    assert_eq!(cfg.watches[0].path, PathBuf::from("/tmp/inbox"));
    assert_eq!(
        cfg.watches[0].mask,
        EventMask::CREATE | EventMask::DELETE | EventMask::CLOSE_WRITE
    );
    assert_eq!(cfg.watches[1].mask, EventMask::ALL_EVENTS);
}

#[test]
fn engine_section_is_optional() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Inwatch.toml");
    fs::write(&path, "[[watch]]\npath = \"/tmp\"\nevents = [\"modify\"]\n").unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.engine.poll_timeout_ms, 100);
    assert_eq!(cfg.engine.mode, ConsumptionMode::Dispatch);
    assert_eq!(cfg.engine.handler_failures, HandlerFailurePolicy::Collect);
    assert_eq!(cfg.engine.init_flags(), InitFlags::CLOEXEC);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, InwatchError::IoError(_)));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[[watch]\npath = ").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, InwatchError::TomlError(_)));
}

#[test]
fn config_without_watches_is_rejected() {
    let err = validate_config(&ConfigFileBuilder::new().raw()).unwrap_err();
    assert!(matches!(err, InwatchError::ConfigError(msg) if msg.contains("at least one")));
}

#[test]
fn unknown_event_name_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_watch("/tmp", &["create", "explode"])
        .raw();
    let err = validate_config(&raw).unwrap_err();
    assert!(matches!(err, InwatchError::ConfigError(msg) if msg.contains("explode")));
}

#[test]
fn empty_event_list_is_rejected() {
    let raw = ConfigFileBuilder::new().with_watch("/tmp", &[]).raw();
    assert!(validate_config(&raw).is_err());
}

#[test]
fn duplicate_paths_are_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_watch("/tmp", &["create"])
        .with_watch("/tmp", &["delete"])
        .raw();
    let err = validate_config(&raw).unwrap_err();
    assert!(matches!(err, InwatchError::ConfigError(msg) if msg.contains("more than once")));
}

#[test]
fn negative_poll_timeout_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_watch("/tmp", &["create"])
        .with_poll_timeout_ms(-1)
        .raw();
    assert!(validate_config(&raw).is_err());
}

#[test]
fn builder_produces_a_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .with_watch("/tmp/a", &["create", "delete"])
        .with_mode(ConsumptionMode::Drain)
        .with_failure_policy(HandlerFailurePolicy::Swallow)
        .build();

    assert_eq!(cfg.watches[0].mask, EventMask::CREATE | EventMask::DELETE);
    assert_eq!(cfg.engine.mode, ConsumptionMode::Drain);
}

fn cli(paths: &[&str]) -> CliArgs {
    CliArgs {
        paths: paths.iter().map(PathBuf::from).collect(),
        events: "create,delete".to_string(),
        config: None,
        timeout_ms: None,
        mode: None,
        log_level: None,
        dry_run: true,
    }
}

#[test]
fn cli_paths_become_watches() {
    let cfg = inwatch::resolve_config(&cli(&["/tmp/a", "/tmp/b"])).unwrap();
    assert_eq!(cfg.watches.len(), 2);
    assert_eq!(cfg.watches[1].path, PathBuf::from("/tmp/b"));
    assert_eq!(cfg.watches[1].mask, EventMask::CREATE | EventMask::DELETE);
}

#[test]
fn cli_overrides_apply_on_top_of_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Inwatch.toml");
    fs::write(
        &path,
        "[engine]\npoll_timeout_ms = 5\n\n[[watch]]\npath = \"/tmp/c\"\nevents = [\"open\"]\n",
    )
    .unwrap();

    let mut args = cli(&["/tmp/d"]);
    args.config = Some(path);
    args.timeout_ms = Some(750);
    args.mode = Some(ConsumptionMode::Drain);

    let cfg = inwatch::resolve_config(&args).unwrap();
    assert_eq!(cfg.engine.poll_timeout_ms, 750);
    assert_eq!(cfg.engine.mode, ConsumptionMode::Drain);
    let paths: Vec<_> = cfg.watches.iter().map(|w| w.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("/tmp/c"), PathBuf::from("/tmp/d")]);
}

#[test]
fn no_paths_and_no_config_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(inwatch::resolve_config_in(&cli(&[]), dir.path()).is_err());
}

#[test]
fn default_config_file_is_picked_up_when_present() {
    let dir = tempdir().unwrap();
    assert_eq!(locate_config(None, dir.path()), None);

    let path = dir.path().join(default_config_path());
    fs::write(&path, "[[watch]]\npath = \"/tmp/e\"\nevents = [\"create\"]\n").unwrap();
    assert_eq!(locate_config(None, dir.path()), Some(path));

    let cfg = inwatch::resolve_config_in(&cli(&[]), dir.path()).unwrap();
    assert_eq!(cfg.watches[0].path, PathBuf::from("/tmp/e"));
}

#[test]
fn explicit_config_wins_over_the_default_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(default_config_path()), "not toml at all [").unwrap();
    let explicit = dir.path().join("other.toml");
    fs::write(&explicit, "[[watch]]\npath = \"/tmp/f\"\nevents = [\"delete\"]\n").unwrap();

    assert_eq!(
        locate_config(Some(explicit.as_path()), dir.path()),
        Some(explicit.clone())
    );

    let mut args = cli(&[]);
    args.config = Some(explicit);
    let cfg = inwatch::resolve_config_in(&args, dir.path()).unwrap();
    assert_eq!(cfg.watches[0].mask, EventMask::DELETE);
}

#[test]
fn cli_event_list_tolerates_spaces_and_empty_items() {
    let mut args = cli(&["/tmp/g"]);
    args.events = " create , ,modify,".to_string();
    let dir = tempdir().unwrap();

    let cfg = inwatch::resolve_config_in(&args, dir.path()).unwrap();
    assert_eq!(cfg.watches[0].mask, EventMask::CREATE | EventMask::MODIFY);
}

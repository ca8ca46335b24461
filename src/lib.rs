// src/lib.rs

pub mod channel;
pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod errors;
pub mod event;
pub mod handler;
pub mod logging;
pub mod notifier;
pub mod registry;
pub mod router;
pub mod types;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_from_path, locate_config, ConfigFile, RawConfigFile, WatchConfig};
use crate::types::split_event_list;

pub use crate::channel::mock::MockChannel;
pub use crate::channel::NotifyChannel;
#[cfg(target_os = "linux")]
pub use crate::channel::inotify::InotifyChannel;
pub use crate::decode::{decode, TruncatedRecord};
pub use crate::engine::{Drained, PollEngine, PollOutcome, PollReport};
pub use crate::errors::{InwatchError, Result};
pub use crate::event::Event;
pub use crate::handler::Handler;
pub use crate::notifier::{Notifier, NotifierOptions};
pub use crate::registry::{Watch, WatchRegistry};
pub use crate::router::{DispatchReport, DispatchRouter, HandlerFailure};
pub use crate::types::{ConsumptionMode, EventMask, HandlerFailurePolicy, InitFlags, WatchId};

/// High-level entry point used by `main.rs`.
///
/// Resolves the watch list, then runs the synchronous poll loop on a
/// blocking thread until Ctrl-C.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));

    // Ctrl-C → graceful shutdown.
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("shutdown requested");
            stop.store(true, Ordering::SeqCst);
        });
    }

    tokio::task::spawn_blocking(move || watch_loop(&cfg, &stop))
        .await
        .context("watch loop thread panicked")?
}

/// Merge `--config`, positional paths and CLI overrides into one validated
/// config.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    resolve_config_in(args, Path::new("."))
}

/// [`resolve_config`], looking for the default config file under `dir`
/// when `--config` is not given.
pub fn resolve_config_in(args: &CliArgs, dir: &Path) -> Result<ConfigFile> {
    let mut raw = match locate_config(args.config.as_deref(), dir) {
        Some(path) => {
            debug!(path = ?path, "loading config file");
            load_from_path(path)?
        }
        None => RawConfigFile::default(),
    };

    if !args.paths.is_empty() {
        let events: Vec<String> = split_event_list(&args.events)
            .map(str::to_string)
            .collect();

        for path in &args.paths {
            raw.watch.push(WatchConfig {
                path: path.to_string_lossy().into_owned(),
                events: events.clone(),
            });
        }
    }

    if let Some(ms) = args.timeout_ms {
        raw.engine.poll_timeout_ms = i32::try_from(ms).unwrap_or(i32::MAX);
    }
    if let Some(mode) = args.mode {
        raw.engine.mode = mode;
    }

    ConfigFile::try_from(raw)
}

#[cfg(target_os = "linux")]
fn watch_loop(cfg: &ConfigFile, stop: &AtomicBool) -> anyhow::Result<()> {
    use tracing::warn;

    // Everything a watch can report about itself, including its own removal.
    let print_filter = EventMask::ALL_EVENTS | EventMask::IGNORED | EventMask::UNMOUNT;

    let mut notifier = Notifier::open_with(cfg.engine.init_flags(), NotifierOptions::from(&cfg.engine))?;

    let mut ids = Vec::with_capacity(cfg.watches.len());
    for spec in &cfg.watches {
        let id = match notifier.add_watch(&spec.path, spec.mask) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "skipping watch");
                continue;
            }
        };

        if notifier.mode() == ConsumptionMode::Dispatch {
            let path = spec.path.clone();
            notifier.attach(
                id,
                print_filter,
                Handler::with_event(move |event: &Event| {
                    println!("{event}\npath:             {}", path.display());
                }),
            )?;
        }
        ids.push(id);
    }

    if ids.is_empty() {
        anyhow::bail!("none of the configured paths could be watched");
    }
    info!(watches = ids.len(), mode = ?notifier.mode(), "watching; press Ctrl-C to stop");

    while !stop.load(Ordering::SeqCst) {
        match notifier.poll(cfg.engine.poll_timeout_ms)? {
            PollOutcome::Dispatched(report) => {
                for failure in &report.dispatch.failures {
                    warn!(error = %failure, "handler failed");
                }
                for event in &report.unrouted {
                    if event.is_overflow() {
                        warn!("kernel event queue overflowed; events were lost");
                    } else {
                        debug!(id = %event.watch_id, mask = %event.mask, "event without a live watch");
                    }
                }
                if let Some(truncated) = &report.truncated {
                    warn!(error = %truncated, "partial read");
                }
            }
            PollOutcome::Drained(drained) => {
                for event in &drained.events {
                    if event.is_overflow() {
                        warn!("kernel event queue overflowed; events were lost");
                    }
                    println!("{event}");
                }
                if let Some(truncated) = &drained.truncated {
                    warn!(error = %truncated, "partial read");
                }
            }
        }
    }

    for id in ids {
        if !notifier.remove_watch(id) {
            debug!(%id, "watch was already gone at shutdown");
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn watch_loop(_cfg: &ConfigFile, _stop: &AtomicBool) -> anyhow::Result<()> {
    anyhow::bail!("inwatch needs Linux inotify; use --dry-run to check a config elsewhere")
}

/// Print the resolved watch list and engine settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("inwatch dry-run");
    println!("  engine.mode = {:?}", cfg.engine.mode);
    println!("  engine.poll_timeout_ms = {}", cfg.engine.poll_timeout_ms);
    println!("  engine.handler_failures = {:?}", cfg.engine.handler_failures);
    println!("  engine.initial_buffer_bytes = {}", cfg.engine.initial_buffer_bytes);
    println!("  engine.init_flags = {:?}", cfg.engine.init_flags());
    println!();

    println!("watches ({}):", cfg.watches.len());
    for spec in &cfg.watches {
        println!("  - {}", spec.path.display());
        println!("      events: {}", spec.mask);
    }

    debug!("dry-run complete (no channel opened)");
}

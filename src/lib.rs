// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod executor;
pub mod fs;
pub mod gtest;
pub mod logging;
pub mod report;
pub mod term;
pub mod types;
pub mod watch;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::build::CmakeBuilder;
use crate::cli::CliArgs;
use crate::config::{load_from_path, ConfigFile, Settings};
use crate::engine::{Monitor, MonitorOptions};
use crate::executor::TestExecutor;
use crate::gtest::GTestRunner;
use crate::report::{Reporter, TerminalReporter};
use crate::term::Terminal;
use crate::types::Verbosity;
use crate::watch::Watcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - watcher / cmake builder / test executor
/// - the terminal reporter
/// - Ctrl-C handling (watch mode)
///
/// Returns whether every test passed. In watch mode that is always `true`
/// once the user stopped watching.
pub async fn run(args: CliArgs) -> Result<bool> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let file = match &args.config {
        Some(path) => load_from_path(path)?,
        None => ConfigFile::default(),
    };
    let settings = Settings::resolve(&args, file, &cwd)?;
    info!(
        watch = %settings.watch_path.display(),
        build = %settings.build_path.display(),
        watch_mode = settings.watch_mode,
        "starting"
    );

    let term = Terminal::stdout(settings.verbosity);
    if settings.verbosity >= Verbosity::Trace {
        term.writeln("Watching:");
        for pattern in settings.filter.include().sources() {
            term.writeln(pattern);
        }
    }

    let watcher = Watcher::new(
        &settings.watch_path,
        Some(settings.build_path.clone()),
        settings.filter.clone(),
    )
    .with_test_prefix(&settings.test_prefix);
    let builder = CmakeBuilder::new(
        &settings.watch_path,
        &settings.build_path,
        settings.cmake.clone(),
        term.clone(),
    )?;
    let executor = TestExecutor::new(GTestRunner::new(term.clone()));
    let reporters: Vec<Box<dyn Reporter>> = vec![Box::new(TerminalReporter::new(
        &settings.watch_path,
        &settings.build_path,
        term,
    ))];

    let mut monitor = Monitor::new(
        watcher,
        builder,
        executor,
        reporters,
        MonitorOptions {
            polling_interval: settings.polling_interval,
        },
    )?;

    if !settings.watch_mode {
        let results = monitor.run_once().await?;
        return Ok(results.total_failed == 0);
    }

    let (tx, mut rx) = mpsc::channel(4);
    let listener = spawn_interrupt_listener(tx);
    let outcome = monitor.run(&mut rx).await;
    listener.abort();
    outcome?;
    Ok(true)
}

/// Forward every Ctrl-C to `tx` until the receiver goes away.
fn spawn_interrupt_listener(tx: mpsc::Sender<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            if tx.send(()).await.is_err() {
                return;
            }
        }
    })
}

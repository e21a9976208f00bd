//! The four build modes.
//!
//! Every mode loads and validates the config and runs a first cycle. Build
//! mode stops there and fails if the cycle failed. The other modes keep
//! watching: serve starts the dev server before the first cycle, run starts
//! the run-artifacts after each successful cycle.

use std::path::Path;
use std::sync::Arc;

use esbw_bundler::{Bundler, EsbuildCli};
use esbw_config::{ConfigDiscovery, Expander, GlobExpander, Mode, ResolvedConfig, Resolver};

use crate::cli::GlobalArgs;
use crate::dev::{DevServer, FileWatcher};
use crate::error::{CliError, Result};
use crate::hooks::HookRunner;
use crate::orchestrator::{BuildOrchestrator, CompletionSignal};
use crate::supervisor::{OsProcessControl, ProcessSupervisor};
use crate::ui;
use crate::watch_loop::WatchLoop;

/// Load the config for `mode` from the project in `global`.
pub fn load_config(global: &GlobalArgs, mode: Mode) -> Result<ResolvedConfig> {
    let mut discovery = ConfigDiscovery::new(&global.cwd);
    if let Some(path) = &global.config {
        discovery = discovery.with_path(path);
    }

    let loaded = discovery.load_resolved(mode)?;
    for warning in &loaded.warnings {
        ui::warning(&warning.to_string());
    }
    Ok(loaded.config)
}

pub fn bundler_for(global: &GlobalArgs) -> EsbuildCli {
    let bundler = EsbuildCli::new(&global.cwd);
    match &global.esbuild {
        Some(program) => bundler.with_program(program),
        None => bundler,
    }
}

/// Run `mode` against the project described by `global`.
pub async fn execute(global: &GlobalArgs, mode: Mode) -> Result<()> {
    let config = Arc::new(load_config(global, mode)?);
    let bundler: Arc<dyn Bundler> = Arc::new(bundler_for(global));
    let expander: Arc<dyn Expander> = Arc::new(GlobExpander::new(&global.cwd));

    run_session(&global.cwd, config, mode, bundler, expander).await
}

/// Drive one mode with explicit collaborators.
pub async fn run_session(
    root: &Path,
    config: Arc<ResolvedConfig>,
    mode: Mode,
    bundler: Arc<dyn Bundler>,
    expander: Arc<dyn Expander>,
) -> Result<()> {
    let completion = CompletionSignal::new();
    let orchestrator = Arc::new(
        BuildOrchestrator::new(
            config.clone(),
            mode,
            bundler,
            expander.clone(),
            HookRunner::new(root),
        )
        .with_completion(completion.clone()),
    );

    let _server = if mode == Mode::Serve {
        Some(DevServer::new(config.clone(), root, completion).start().await?)
    } else {
        None
    };

    let report = orchestrator.run_cycle().await?;
    if mode == Mode::Build {
        return if report.succeeded() {
            Ok(())
        } else {
            Err(CliError::CycleFailed(report.error_summary()))
        };
    }

    let supervisor = (mode == Mode::Run)
        .then(|| Arc::new(ProcessSupervisor::new(Arc::new(OsProcessControl), root)));
    if let Some(supervisor) = &supervisor {
        if report.succeeded() {
            supervisor.start_all(&config)?;
        }
    }

    let paths = Resolver::new(&config, expander.as_ref()).watch_paths(mode)?;
    let (watcher, changes) = FileWatcher::new(root, paths.iter())?;
    ui::info(&format!("watching {} path(s) for changes", paths.len()));
    tracing::debug!(watched = ?watcher.watched(), "watcher ready");

    let mut watch_loop = WatchLoop::new(orchestrator);
    if let Some(supervisor) = &supervisor {
        watch_loop = watch_loop.with_supervisor(supervisor.clone());
    }

    tokio::select! {
        result = watch_loop.run(changes) => result,
        _ = tokio::signal::ctrl_c() => {
            ui::info("shutting down");
            if let Some(supervisor) = &supervisor {
                supervisor.stop_all().await?;
            }
            Ok(())
        }
    }
}

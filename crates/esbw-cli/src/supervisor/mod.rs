//! Child processes of run mode.
//!
//! After every successful run-mode cycle one child is started per
//! run-artifact. Before the next cycle the children are stopped: a graceful
//! signal first, then up to three forceful ones, each followed by a bounded
//! wait for the exit observer to drop the child from the live table. A child
//! that survives all of them is fatal.

mod process;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use esbw_config::{Mode, ResolvedConfig, merge_spec};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::{Instant, sleep};

use crate::ui;

pub use process::OsProcessControl;

/// Interval at which the live table is polled while waiting for an exit.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long each stop attempt waits before escalating.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Forceful attempts after the graceful one.
pub const FORCEFUL_ATTEMPTS: u8 = 3;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(
        "no runfile for artifact '{artifact}'\n\nHint: set runMode.runfile or give the artifact an outfile"
    )]
    MissingRunfile { artifact: String },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("pid {pid} is still alive after {attempts} stop attempts")]
    Unkillable { pid: u32, attempts: usize },
}

/// Signals used to stop a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGHUP
    Graceful,
    /// SIGKILL
    Forceful,
}

impl StopSignal {
    pub fn name(self) -> &'static str {
        match self {
            StopSignal::Graceful => "SIGHUP",
            StopSignal::Forceful => "SIGKILL",
        }
    }
}

/// What to execute for a run-artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl RunCommand {
    /// `runner` may carry its own arguments, e.g. `node --enable-source-maps`.
    pub fn new(runner: &str, runfile: &str, cwd: impl Into<PathBuf>) -> Self {
        let mut parts = runner.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| esbw_config::DEFAULT_RUNNER.to_string());
        let mut args: Vec<String> = parts.collect();
        args.push(runfile.to_string());
        Self {
            program,
            args,
            cwd: cwd.into(),
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A started child: its pid and a future resolving to its exit code.
pub struct SpawnedChild {
    pub pid: u32,
    pub exit: BoxFuture<'static, Option<i32>>,
}

/// Process spawning, signalling and liveness probing.
pub trait ProcessControl: Send + Sync {
    fn spawn(&self, command: &RunCommand) -> io::Result<SpawnedChild>;

    fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<()>;

    /// Zero-signal liveness check.
    fn is_alive(&self, pid: u32) -> bool;
}

/// A live child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecord {
    pub pid: u32,
    pub artifact: String,
    pub command: String,
}

/// One step of the stop escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Graceful,
    Forceful(u8),
}

impl Attempt {
    pub fn signal(self) -> StopSignal {
        match self {
            Attempt::Graceful => StopSignal::Graceful,
            Attempt::Forceful(_) => StopSignal::Forceful,
        }
    }

    pub fn next(self) -> Option<Attempt> {
        match self {
            Attempt::Graceful => Some(Attempt::Forceful(1)),
            Attempt::Forceful(n) if n < FORCEFUL_ATTEMPTS => Some(Attempt::Forceful(n + 1)),
            Attempt::Forceful(_) => None,
        }
    }
}

type LiveTable = Arc<Mutex<IndexMap<u32, ChildRecord>>>;

/// Owns the live-child table of a run-mode session.
pub struct ProcessSupervisor {
    control: Arc<dyn ProcessControl>,
    live: LiveTable,
    cwd: PathBuf,
}

impl ProcessSupervisor {
    pub fn new(control: Arc<dyn ProcessControl>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            control,
            live: Arc::new(Mutex::new(IndexMap::new())),
            cwd: cwd.into(),
        }
    }

    pub fn live_children(&self) -> Vec<ChildRecord> {
        self.live.lock().values().cloned().collect()
    }

    pub fn is_live(&self, pid: u32) -> bool {
        self.live.lock().contains_key(&pid)
    }

    pub fn is_idle(&self) -> bool {
        self.live.lock().is_empty()
    }

    /// Start one child per run-artifact of `config`.
    ///
    /// The runfile is `runMode.runfile` when set, otherwise the artifact's
    /// `outfile`. Fails before spawning anything if an artifact has neither.
    pub fn start_all(&self, config: &ResolvedConfig) -> Result<Vec<u32>, SupervisorError> {
        let section = config.mode(Mode::Run);
        let mut commands = Vec::with_capacity(section.build.len());

        for name in &section.build {
            let runfile = match &config.run.runfile {
                Some(runfile) => runfile.clone(),
                None => config
                    .artifact(name)
                    .map(|a| merge_spec(&config.artifacts_common, a, &section.overrides))
                    .and_then(|spec| spec.outfile().map(str::to_string))
                    .ok_or_else(|| SupervisorError::MissingRunfile {
                        artifact: name.clone(),
                    })?,
            };
            commands.push((
                name.clone(),
                RunCommand::new(&config.run.runner, &runfile, &self.cwd),
            ));
        }

        let mut pids = Vec::with_capacity(commands.len());
        for (artifact, command) in commands {
            ui::info(&format!("Running artifact \"{artifact}\"."));
            pids.push(self.start(&artifact, &command)?);
        }
        Ok(pids)
    }

    /// Spawn `command` for `artifact` and register its exit observer.
    pub fn start(&self, artifact: &str, command: &RunCommand) -> Result<u32, SupervisorError> {
        let display = command.display();
        let child = self
            .control
            .spawn(command)
            .map_err(|source| SupervisorError::Spawn {
                command: display.clone(),
                source,
            })?;
        let pid = child.pid;

        self.live.lock().insert(
            pid,
            ChildRecord {
                pid,
                artifact: artifact.to_string(),
                command: display.clone(),
            },
        );
        ui::log_with_time(&format!("{display} -> pid {pid}"));

        let live = self.live.clone();
        let exit = child.exit;
        tokio::spawn(async move {
            let code = exit.await;
            live.lock().shift_remove(&pid);
            let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
            ui::log_with_time(&format!("pid {pid} exited with code {code}"));
        });

        Ok(pid)
    }

    /// Stop `pid`, escalating until it is gone.
    ///
    /// Signals are only sent while the liveness check confirms the process is alive.
    /// Returns [`SupervisorError::Unkillable`] once every attempt has expired.
    pub async fn stop(&self, pid: u32) -> Result<(), SupervisorError> {
        let mut attempt = Some(Attempt::Graceful);
        let mut made = 0;

        while let Some(current) = attempt {
            if !self.is_live(pid) {
                return Ok(());
            }

            if self.control.is_alive(pid) {
                let signal = current.signal();
                match current {
                    Attempt::Graceful => {
                        ui::log_with_time(&format!("sending {} to pid {pid}", signal.name()))
                    }
                    Attempt::Forceful(_) => ui::warning(&format!(
                        "pid {pid} still alive after {}ms, sending {}",
                        ATTEMPT_TIMEOUT.as_millis(),
                        signal.name()
                    )),
                }
                if let Err(err) = self.control.signal(pid, signal) {
                    tracing::debug!(pid, signal = signal.name(), %err, "signal not delivered");
                }
            }
            made += 1;

            if self.wait_for_exit(pid, ATTEMPT_TIMEOUT).await {
                return Ok(());
            }
            attempt = current.next();
        }

        ui::error(&format!("pid {pid} refused to exit"));
        Err(SupervisorError::Unkillable {
            pid,
            attempts: made,
        })
    }

    /// Stop every live child, in start order.
    pub async fn stop_all(&self) -> Result<(), SupervisorError> {
        let pids: Vec<u32> = self.live.lock().keys().copied().collect();
        for pid in pids {
            self.stop(pid).await?;
        }
        Ok(())
    }

    /// Wait until no child is live.
    pub async fn wait_until_idle(&self) {
        while !self.is_idle() {
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_live(pid) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_is_graceful_then_three_forceful() {
        let mut steps = Vec::new();
        let mut attempt = Some(Attempt::Graceful);
        while let Some(current) = attempt {
            steps.push(current.signal());
            attempt = current.next();
        }
        assert_eq!(
            steps,
            vec![
                StopSignal::Graceful,
                StopSignal::Forceful,
                StopSignal::Forceful,
                StopSignal::Forceful
            ]
        );
    }

    #[test]
    fn runner_arguments_precede_the_runfile() {
        let command = RunCommand::new("node --enable-source-maps", "dist/index.js", "/app");
        assert_eq!(command.program, "node");
        assert_eq!(command.args, vec!["--enable-source-maps", "dist/index.js"]);
        assert_eq!(command.display(), "node --enable-source-maps dist/index.js");
    }

    #[test]
    fn empty_runner_falls_back_to_node() {
        let command = RunCommand::new("", "server.js", ".");
        assert_eq!(command.display(), "node server.js");
    }
}

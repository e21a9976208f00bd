//! Build cycles.
//!
//! A cycle moves through `Idle -> BeforeHook -> Building -> AfterHook -> Idle`,
//! or ends in `Failed -> Idle` when a hook or any artifact build fails. All
//! artifacts of a cycle are submitted to the bundler at once and awaited
//! together; a failed cycle is not retried, the next change event is the
//! retry.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use esbw_bundler::{BuildError, BuildOutput, Bundler};
use esbw_config::{Expander, Mode, ResolveError, ResolvedArtifact, ResolvedConfig, Resolver};
use futures::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::hooks::{HookError, HookRunner};
use crate::ui;

/// Where the orchestrator is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    BeforeHook,
    Building,
    AfterHook,
    Failed,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CyclePhase::Idle => "idle",
            CyclePhase::BeforeHook => "before-hook",
            CyclePhase::Building => "building",
            CyclePhase::AfterHook => "after-hook",
            CyclePhase::Failed => "failed",
        })
    }
}

/// Why a cycle failed. Build failures of several artifacts are all kept.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("beforeAll: {0}")]
    BeforeHook(#[source] HookError),

    #[error("afterAll: {0}")]
    AfterHook(#[source] HookError),

    #[error(transparent)]
    Build(BuildError),
}

/// Outcome of one cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub mode: Mode,
    /// Output of each artifact that built, in submission order.
    pub outputs: Vec<(String, BuildOutput)>,
    pub errors: Vec<CycleError>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn artifact_count(&self) -> usize {
        self.outputs.len()
    }

    /// All error messages, one per line.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Broadcast fired once per successful serve-mode cycle.
///
/// Subscribers only see completions that happen after they subscribed.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    tx: broadcast::Sender<u64>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Fire for cycle `cycle`. Returns how many subscribers were notified.
    pub fn notify(&self, cycle: u64) -> usize {
        self.tx.send(cycle).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs build cycles for one mode.
pub struct BuildOrchestrator {
    config: Arc<ResolvedConfig>,
    mode: Mode,
    bundler: Arc<dyn Bundler>,
    expander: Arc<dyn Expander>,
    hooks: HookRunner,
    completion: CompletionSignal,
    phase: Mutex<CyclePhase>,
    cycles: Mutex<u64>,
}

impl BuildOrchestrator {
    pub fn new(
        config: Arc<ResolvedConfig>,
        mode: Mode,
        bundler: Arc<dyn Bundler>,
        expander: Arc<dyn Expander>,
        hooks: HookRunner,
    ) -> Self {
        Self {
            config,
            mode,
            bundler,
            expander,
            hooks,
            completion: CompletionSignal::new(),
            phase: Mutex::new(CyclePhase::Idle),
            cycles: Mutex::new(0),
        }
    }

    /// Share an existing completion signal, e.g. one the dev server already
    /// subscribes to.
    pub fn with_completion(mut self, completion: CompletionSignal) -> Self {
        self.completion = completion;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    pub fn phase(&self) -> CyclePhase {
        *self.phase.lock()
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        *self.cycles.lock()
    }

    fn enter(&self, phase: CyclePhase) {
        tracing::debug!(mode = %self.mode, %phase, "cycle phase");
        *self.phase.lock() = phase;
    }

    /// Run one cycle.
    ///
    /// Hook and build failures are reported in the returned [`CycleReport`].
    /// A resolution error aborts the cycle and is returned as `Err`.
    pub async fn run_cycle(&self) -> Result<CycleReport, ResolveError> {
        let cycle = {
            let mut cycles = self.cycles.lock();
            *cycles += 1;
            *cycles
        };
        let started = Instant::now();
        let section = self.config.mode(self.mode);
        let mut report = CycleReport {
            mode: self.mode,
            outputs: Vec::new(),
            errors: Vec::new(),
            elapsed: Duration::ZERO,
        };

        if let Some(hook) = &section.before_all {
            self.enter(CyclePhase::BeforeHook);
            if let Err(err) = self.hooks.run(hook).await {
                ui::error(&format!("beforeAll hook failed: {err}"));
                report.errors.push(CycleError::BeforeHook(err));
                return Ok(self.finish_failed(report, started));
            }
        }

        self.enter(CyclePhase::Building);
        let artifacts = match Resolver::new(&self.config, self.expander.as_ref()).resolve(self.mode)
        {
            Ok(artifacts) => artifacts,
            Err(err) => {
                self.enter(CyclePhase::Idle);
                return Err(err);
            }
        };

        ui::info("Building artifacts...");
        for artifact in &artifacts {
            ui::info(&format!("Building artifact \"{}\".", artifact.name));
        }

        let results = join_all(artifacts.iter().map(|a| self.compile(a))).await;
        for (artifact, result) in artifacts.iter().zip(results) {
            match result {
                Ok(output) => report.outputs.push((artifact.name.clone(), output)),
                Err(err) => {
                    ui::error(&err.to_string());
                    report.errors.push(CycleError::Build(err));
                }
            }
        }

        if !report.succeeded() {
            return Ok(self.finish_failed(report, started));
        }

        for (_, output) in &report.outputs {
            ui::print_size_report(output);
        }
        let elapsed = started.elapsed();
        ui::log_with_time(&format!(
            "wrote {} artifact(s) in {}",
            report.artifact_count(),
            ui::format_duration(elapsed)
        ));
        if self.mode == Mode::Serve {
            let notified = self.completion.notify(cycle);
            tracing::debug!(cycle, notified, "signalled build completion");
        }

        if let Some(hook) = &section.after_all {
            self.enter(CyclePhase::AfterHook);
            if let Err(err) = self.hooks.run(hook).await {
                ui::error(&format!("afterAll hook failed: {err}"));
                report.errors.push(CycleError::AfterHook(err));
                return Ok(self.finish_failed(report, started));
            }
        }

        self.enter(CyclePhase::Idle);
        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn compile(&self, artifact: &ResolvedArtifact) -> Result<BuildOutput, BuildError> {
        self.bundler.compile(artifact).await
    }

    fn finish_failed(&self, mut report: CycleReport, started: Instant) -> CycleReport {
        self.enter(CyclePhase::Failed);
        report.elapsed = started.elapsed();
        tracing::debug!(mode = %self.mode, errors = report.errors.len(), "cycle failed");
        self.enter(CyclePhase::Idle);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_without_subscribers_reaches_nobody() {
        let signal = CompletionSignal::new();
        assert_eq!(signal.notify(1), 0);
    }

    #[tokio::test]
    async fn subscribers_only_see_later_completions() {
        let signal = CompletionSignal::new();
        signal.notify(1);

        let mut rx = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 1);
        assert_eq!(signal.notify(2), 1);
        assert_eq!(rx.recv().await.unwrap(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn phases_display_in_kebab_case() {
        assert_eq!(CyclePhase::BeforeHook.to_string(), "before-hook");
        assert_eq!(CyclePhase::Idle.to_string(), "idle");
    }
}

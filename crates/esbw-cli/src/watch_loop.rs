//! Turning file changes into build cycles.
//!
//! One cycle runs at a time. Changes that arrive while a cycle is running
//! are queued in the channel and collapse into a single follow-up cycle.
//! In run mode each cycle is preceded by stopping the live children and
//! waiting until none remain, and followed by restarting them.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dev::FileChange;
use crate::error::Result;
use crate::orchestrator::{BuildOrchestrator, CycleReport};
use crate::supervisor::ProcessSupervisor;

pub struct WatchLoop {
    orchestrator: Arc<BuildOrchestrator>,
    supervisor: Option<Arc<ProcessSupervisor>>,
}

impl WatchLoop {
    pub fn new(orchestrator: Arc<BuildOrchestrator>) -> Self {
        Self {
            orchestrator,
            supervisor: None,
        }
    }

    /// Run mode: gate cycles on `supervisor` and restart children after them.
    pub fn with_supervisor(mut self, supervisor: Arc<ProcessSupervisor>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Process changes until the channel closes.
    ///
    /// Build failures keep the loop going. Resolution and supervisor errors
    /// end it.
    pub async fn run(&self, mut changes: mpsc::Receiver<FileChange>) -> Result<()> {
        while let Some(change) = changes.recv().await {
            let mut coalesced = 0usize;
            while changes.try_recv().is_ok() {
                coalesced += 1;
            }
            tracing::debug!(path = %change.path().display(), coalesced, "change detected");

            self.on_change().await?;
        }
        Ok(())
    }

    /// Handle one (coalesced) change.
    pub async fn on_change(&self) -> Result<CycleReport> {
        if let Some(supervisor) = &self.supervisor {
            supervisor.stop_all().await?;
            supervisor.wait_until_idle().await;
        }

        let report = self.orchestrator.run_cycle().await?;

        if let Some(supervisor) = &self.supervisor {
            if report.succeeded() {
                supervisor.start_all(self.orchestrator.config())?;
            }
        }
        Ok(report)
    }
}

//! Integration tests for run-mode child supervision.
//!
//! Children are simulated: a fake process control hands out pids and exits
//! a child when it receives the signal it obeys. Time is paused so the
//! escalation timeouts elapse instantly.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use esbw_cli::supervisor::{
    ATTEMPT_TIMEOUT, FORCEFUL_ATTEMPTS, ProcessControl, ProcessSupervisor, RunCommand,
    SpawnedChild, StopSignal, SupervisorError,
};
use esbw_config::{EsbwConfig, ResolvedConfig};
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};

struct FakeControl {
    /// Signal that makes a child exit; `None` means it never exits.
    obeys: Option<StopSignal>,
    next_pid: AtomicU32,
    exits: Mutex<HashMap<u32, oneshot::Sender<Option<i32>>>>,
    signals: Mutex<Vec<(u32, StopSignal)>>,
    spawned: Mutex<Vec<RunCommand>>,
}

impl FakeControl {
    fn new(obeys: Option<StopSignal>) -> Arc<Self> {
        Arc::new(Self {
            obeys,
            next_pid: AtomicU32::new(100),
            exits: Mutex::new(HashMap::new()),
            signals: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
        })
    }

    /// Exit `pid` on its own.
    fn exit(&self, pid: u32, code: i32) {
        if let Some(tx) = self.exits.lock().remove(&pid) {
            let _ = tx.send(Some(code));
        }
    }

    fn signals(&self) -> Vec<StopSignal> {
        self.signals.lock().iter().map(|(_, s)| *s).collect()
    }
}

impl ProcessControl for FakeControl {
    fn spawn(&self, command: &RunCommand) -> io::Result<SpawnedChild> {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.exits.lock().insert(pid, tx);
        self.spawned.lock().push(command.clone());
        Ok(SpawnedChild {
            pid,
            exit: async move { rx.await.ok().flatten() }.boxed(),
        })
    }

    fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<()> {
        self.signals.lock().push((pid, signal));
        if self.obeys == Some(signal) {
            if let Some(tx) = self.exits.lock().remove(&pid) {
                let _ = tx.send(None);
            }
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.exits.lock().contains_key(&pid)
    }
}

fn config(value: Value) -> ResolvedConfig {
    EsbwConfig::from_value(value).unwrap().resolve()
}

fn two_servers() -> ResolvedConfig {
    config(json!({
        "artifacts": {
            "api": { "format": "cjs", "outfile": "dist/api.js" },
            "worker": { "format": "cjs", "outfile": "dist/worker.js" },
            "web": { "format": "esm", "outfile": "dist/web.js" }
        },
        "runMode": { "build": ["api", "worker"], "runner": "node --inspect" }
    }))
}

/// Let spawned exit observers run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_one_child_per_run_artifact() {
    let control = FakeControl::new(Some(StopSignal::Graceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");

    let pids = supervisor.start_all(&two_servers()).unwrap();

    assert_eq!(pids.len(), 2);
    let commands: Vec<String> = control.spawned.lock().iter().map(RunCommand::display).collect();
    assert_eq!(
        commands,
        vec!["node --inspect dist/api.js", "node --inspect dist/worker.js"]
    );
    let artifacts: Vec<String> = supervisor
        .live_children()
        .into_iter()
        .map(|c| c.artifact)
        .collect();
    assert_eq!(artifacts, vec!["api", "worker"]);
}

#[tokio::test(start_paused = true)]
async fn test_runfile_overrides_outfile() {
    let control = FakeControl::new(Some(StopSignal::Graceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    let cfg = config(json!({
        "artifacts": { "main": { "format": "esm", "outfile": "dist/index.js" } },
        "runMode": { "runfile": "scripts/start.js" }
    }));

    supervisor.start_all(&cfg).unwrap();

    assert_eq!(control.spawned.lock()[0].display(), "node scripts/start.js");
}

#[tokio::test(start_paused = true)]
async fn test_missing_runfile_spawns_nothing() {
    let control = FakeControl::new(Some(StopSignal::Graceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    let cfg = config(json!({
        "artifacts": {
            "main": { "format": "esm", "outfile": "dist/index.js" },
            "chunks": { "format": "esm", "outdir": "dist/chunks" }
        }
    }));

    let err = supervisor.start_all(&cfg).unwrap_err();

    assert!(matches!(err, SupervisorError::MissingRunfile { ref artifact } if artifact == "chunks"));
    assert!(control.spawned.lock().is_empty());
    assert!(supervisor.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_graceful_stop_needs_no_escalation() {
    let control = FakeControl::new(Some(StopSignal::Graceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    supervisor.start_all(&two_servers()).unwrap();

    supervisor.stop_all().await.unwrap();

    assert_eq!(control.signals(), vec![StopSignal::Graceful, StopSignal::Graceful]);
    assert!(supervisor.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_stubborn_child_gets_forceful_signal() {
    let control = FakeControl::new(Some(StopSignal::Forceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    let pid = supervisor.start_all(&two_servers()).unwrap()[0];

    let started = Instant::now();
    supervisor.stop(pid).await.unwrap();

    assert_eq!(control.signals(), vec![StopSignal::Graceful, StopSignal::Forceful]);
    assert!(started.elapsed() >= ATTEMPT_TIMEOUT);
    assert!(!supervisor.is_live(pid));
}

#[tokio::test(start_paused = true)]
async fn test_unkillable_child_is_fatal() {
    let control = FakeControl::new(None);
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    let pid = supervisor.start_all(&two_servers()).unwrap()[0];

    let err = supervisor.stop(pid).await.unwrap_err();

    match err {
        SupervisorError::Unkillable { pid: p, attempts } => {
            assert_eq!(p, pid);
            assert_eq!(attempts, 1 + usize::from(FORCEFUL_ATTEMPTS));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        control.signals(),
        vec![
            StopSignal::Graceful,
            StopSignal::Forceful,
            StopSignal::Forceful,
            StopSignal::Forceful
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_exited_child_is_not_signalled() {
    let control = FakeControl::new(Some(StopSignal::Graceful));
    let supervisor = ProcessSupervisor::new(control.clone(), "/app");
    let pid = supervisor.start_all(&two_servers()).unwrap()[0];

    control.exit(pid, 0);
    settle().await;

    assert!(!supervisor.is_live(pid));
    supervisor.stop(pid).await.unwrap();
    assert!(control.signals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_idle_returns_after_last_exit() {
    let control = FakeControl::new(None);
    let supervisor = Arc::new(ProcessSupervisor::new(control.clone(), "/app"));
    let pids = supervisor.start_all(&two_servers()).unwrap();

    let waiter = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.wait_until_idle().await })
    };

    control.exit(pids[0], 0);
    settle().await;
    assert!(!waiter.is_finished());

    control.exit(pids[1], 1);
    waiter.await.unwrap();
    assert!(supervisor.is_idle());
}

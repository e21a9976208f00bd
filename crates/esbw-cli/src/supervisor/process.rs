//! Operating-system process control.

use std::io;
use std::process::Stdio;

use futures::FutureExt;
use tokio::process::Command;

use super::{ProcessControl, RunCommand, SpawnedChild, StopSignal};

/// Spawns real children with inherited stdio.
///
/// Signals are only supported on unix; elsewhere `signal` reports
/// [`io::ErrorKind::Unsupported`] and children are left to exit on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessControl;

impl ProcessControl for OsProcessControl {
    fn spawn(&self, command: &RunCommand) -> io::Result<SpawnedChild> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("child exited before its pid was read"))?;

        let exit = async move {
            match child.wait().await {
                Ok(status) => status.code(),
                Err(err) => {
                    tracing::debug!(pid, %err, "failed to wait for child");
                    None
                }
            }
        }
        .boxed();

        Ok(SpawnedChild { pid, exit })
    }

    #[cfg(unix)]
    fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<()> {
        use nix::sys::signal::{Signal, kill};

        let signal = match signal {
            StopSignal::Graceful => Signal::SIGHUP,
            StopSignal::Forceful => Signal::SIGKILL,
        };
        kill(to_pid(pid)?, signal).map_err(|errno| io::Error::from_raw_os_error(errno as i32))
    }

    #[cfg(not(unix))]
    fn signal(&self, _pid: u32, _signal: StopSignal) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    #[cfg(unix)]
    fn is_alive(&self, pid: u32) -> bool {
        to_pid(pid).is_ok_and(|pid| nix::sys::signal::kill(pid, None).is_ok())
    }

    #[cfg(not(unix))]
    fn is_alive(&self, _pid: u32) -> bool {
        true
    }
}

#[cfg(unix)]
fn to_pid(pid: u32) -> io::Result<nix::unistd::Pid> {
    i32::try_from(pid)
        .map(nix::unistd::Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("pid {pid} out of range")))
}

//! Lifecycle hooks (`beforeAll` / `afterAll`).
//!
//! In a config file a hook is a shell command. Hosts embedding esbw can
//! register an async closure instead.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
pub type HookFn = Arc<dyn Fn() -> HookFuture + Send + Sync>;

/// A zero-argument asynchronous action run around a build cycle.
#[derive(Clone)]
pub enum Hook {
    /// Shell command, run through the platform shell.
    Command(String),
    /// Async closure provided by the host.
    Action(HookFn),
}

impl Hook {
    pub fn command(command: impl Into<String>) -> Self {
        Hook::Command(command.into())
    }

    pub fn action<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Hook::Action(Arc::new(move || Box::pin(f())))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Hook::Action(_) => f.write_str("Action(..)"),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Command(cmd) => write!(f, "`{cmd}`"),
            Hook::Action(_) => f.write_str("<action>"),
        }
    }
}

impl<'de> Deserialize<'de> for Hook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Hook::Command)
    }
}

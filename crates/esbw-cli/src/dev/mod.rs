//! Serve mode: dev server, live-reload stream and file watching.

pub mod html;
pub mod mime;
pub mod reload;
pub mod server;
pub mod watcher;

pub use html::{ScriptTag, inject_scripts, reload_script};
pub use reload::reload_router;
pub use server::{DevServer, DevServerHandle, ServeState, main_router};
pub use watcher::{FileChange, FileWatcher};

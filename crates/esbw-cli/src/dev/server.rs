//! Development server.
//!
//! Two listeners: the main server for the project files and the live-reload
//! stream (see [`crate::dev::reload`]). Route-style requests, those whose
//! last path segment has no extension, get the index document with the
//! artifact and reload scripts injected. Everything else is served from the
//! project directory.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use esbw_config::{Format, Mode, ResolvedConfig, merge_spec};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::dev::html::{ScriptTag, generated_index, inject_scripts};
use crate::dev::mime::content_type;
use crate::dev::reload::reload_router;
use crate::error::{CliError, Result, ResultExt};
use crate::orchestrator::CompletionSignal;
use crate::ui;

/// Everything the main server needs to answer a request.
#[derive(Debug, Clone)]
pub struct ServeState {
    pub root: PathBuf,
    /// Index document, relative to `root`.
    pub index: PathBuf,
    /// Title of the generated index.
    pub title: String,
    pub scripts: Vec<ScriptTag>,
    pub reload_url: String,
}

impl ServeState {
    /// Derive the state for `config` with the reload stream at `reload_port`.
    ///
    /// Each injected artifact contributes its `outfile`, loaded as a module
    /// when its effective format is ESM.
    pub fn from_config(config: &ResolvedConfig, root: impl Into<PathBuf>, reload_port: u16) -> Self {
        let root = root.into();
        let overrides = &config.mode(Mode::Serve).overrides;
        let scripts = config
            .serve
            .inject_artifacts
            .iter()
            .filter_map(|name| config.artifact(name))
            .map(|artifact| merge_spec(&config.artifacts_common, artifact, overrides))
            .filter_map(|spec| {
                spec.outfile().map(|outfile| ScriptTag {
                    src: outfile.to_string(),
                    module: spec.format() == Some(Format::Esm),
                })
            })
            .collect();

        let title = root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "esbw".to_string());

        Self {
            index: config.serve.index.clone(),
            title,
            scripts,
            reload_url: format!("http://localhost:{reload_port}"),
            root,
        }
    }
}

/// Router of the main server.
pub fn main_router(state: Arc<ServeState>) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Running server tasks. Dropping the handle leaves them running; call
/// [`DevServerHandle::shutdown`] to stop them.
pub struct DevServerHandle {
    pub addr: SocketAddr,
    pub reload_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl DevServerHandle {
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

/// Dev server for one serve-mode session.
pub struct DevServer {
    root: PathBuf,
    config: Arc<ResolvedConfig>,
    completion: CompletionSignal,
}

impl DevServer {
    pub fn new(
        config: Arc<ResolvedConfig>,
        root: impl Into<PathBuf>,
        completion: CompletionSignal,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            completion,
        }
    }

    /// Bind both listeners on localhost and start serving.
    ///
    /// The reload listener is bound first so the injected script can name
    /// its actual port when `reloadPort` is 0.
    pub async fn start(self) -> Result<DevServerHandle> {
        let serve = &self.config.serve;
        let reload_listener = bind(serve.reload_port).await?;
        let reload_addr = reload_listener.local_addr()?;
        let main_listener = bind(serve.port).await?;
        let addr = main_listener.local_addr()?;

        let state = Arc::new(ServeState::from_config(
            &self.config,
            &self.root,
            reload_addr.port(),
        ));

        let reload = tokio::spawn(serve_router(
            reload_listener,
            reload_router(self.completion.clone()),
            "live-reload",
        ));
        let main = tokio::spawn(serve_router(main_listener, main_router(state), "dev server"));

        ui::log_with_time(&format!("http://localhost:{}", addr.port()));
        tracing::debug!(%addr, %reload_addr, "dev server listening");

        Ok(DevServerHandle {
            addr,
            reload_addr,
            tasks: vec![reload, main],
        })
    }
}

async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("failed to bind to {addr}: {e}")))
        .with_hint("Set serveMode.port and serveMode.reloadPort to free ports, or 0 to pick any")
}

async fn serve_router(listener: TcpListener, router: Router, name: &'static str) {
    if let Err(err) = axum::serve(listener, router).await {
        ui::error(&format!("{name} stopped: {err}"));
    }
}

/// Whether `path` names a route rather than a file.
pub fn is_route_request(path: &str) -> bool {
    path.rsplit('/').next().is_none_or(|last| !last.contains('.'))
}

async fn handle_request(State(state): State<Arc<ServeState>>, uri: Uri) -> Response {
    let raw = uri.path();
    let Ok(path) = urlencoding::decode(raw) else {
        return not_found(raw);
    };

    if is_route_request(&path) {
        return serve_index(&state).await;
    }

    let Some(relative) = sanitize(&path) else {
        return not_found(&path);
    };
    let file = state.root.join(relative);

    match tokio::fs::read(&file).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type(&path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => not_found(&path),
        Err(err) => {
            ui::warning(&format!("failed to read {}: {err}", file.display()));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Resource {path} could not be read"),
            )
                .into_response()
        }
    }
}

async fn serve_index(state: &ServeState) -> Response {
    let document = match tokio::fs::read_to_string(state.root.join(&state.index)).await {
        Ok(document) => document,
        Err(err) => {
            tracing::debug!(index = %state.index.display(), %err, "serving generated index");
            generated_index(&state.title)
        }
    };
    let html = inject_scripts(&document, &state.scripts, &state.reload_url);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        html,
    )
        .into_response()
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Resource {path} not found"),
    )
        .into_response()
}

/// Relative path for a decoded request path, or `None` if it would escape
/// the served root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!clean.as_os_str().is_empty()).then_some(clean)
}

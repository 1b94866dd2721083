use crate::session::SessionRegistry;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Recording sessions (id → session)
    pub registry: Arc<SessionRegistry>,

    /// Directory every save path resolves under
    pub output_dir: PathBuf,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            output_dir: output_dir.into(),
        }
    }

    /// Resolve a client-supplied file name under `output_dir`.
    ///
    /// Returns `None` for empty, absolute, or `..`-containing paths, so a
    /// request can never write outside the recordings directory.
    pub fn output_path(&self, requested: &str) -> Option<PathBuf> {
        let requested = Path::new(requested);
        let mut components = requested.components().peekable();

        components.peek()?;
        if !components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            return None;
        }
        if requested.file_name().is_none() {
            return None;
        }

        Some(self.output_dir.join(requested))
    }
}

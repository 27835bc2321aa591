use std::fs;
use std::path::PathBuf;

use tracing::warn;

/// Mirrors the most recent account snapshot to a local file, verbatim as the
/// vendor sent it. Strictly best-effort: a failed write is logged and
/// swallowed so it can never fail a refresh.
pub(crate) struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Replaces the mirror with the latest body.
    pub fn record(&self, body: &str) {
        if let Err(e) = fs::write(&self.path, body) {
            warn!("failed to mirror snapshot to {}: {e}", self.path.display());
        }
    }
}

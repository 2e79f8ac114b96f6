//! Logging flag persisted as the presence of a marker file.

use crate::error::PersistenceError;
use std::path::{Path, PathBuf};

const MARKER_CONTENT: &str = "enabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMarker {
    path: PathBuf,
}

impl LogMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Create or remove the marker. Setting the current value is a no-op.
    pub fn set(&self, enabled: bool) -> Result<(), PersistenceError> {
        match (enabled, self.is_set()) {
            (true, false) => {
                std::fs::write(&self.path, MARKER_CONTENT).map_err(|source| PersistenceError {
                    action: "create",
                    path: self.path.clone(),
                    source,
                })
            }
            (false, true) => std::fs::remove_file(&self.path).map_err(|source| PersistenceError {
                action: "remove",
                path: self.path.clone(),
                source,
            }),
            _ => Ok(()),
        }
    }
}

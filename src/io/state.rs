use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::ops::triage::TriageState;

/// Error type for writing the local triage state
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: String,
        source: io::Error,
    },
    #[error("could not serialize triage state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read the triage state file. Missing or unreadable files give `None`.
pub fn read_triage_state(path: &Path) -> Option<TriageState> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            log::warn!("ignoring malformed triage state {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the triage state file atomically, creating its directory if needed
pub fn write_triage_state(path: &Path, state: &TriageState) -> Result<(), StateError> {
    let content = serde_json::to_string_pretty(state)?;
    let wrap = |source: io::Error| StateError::WriteError {
        path: path.display().to_string(),
        source,
    };
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(wrap)?;
    }
    atomic_write(path, content.as_bytes()).map_err(wrap)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

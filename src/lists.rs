use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::utils::uuid_fmt;

/// One entry of `whitelist.json` or `banned-players.json`; other keys are ignored.
#[derive(Debug, Deserialize)]
struct ListEntry {
    uuid: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("cannot read {0:?}: {1}")]
    Io(std::path::PathBuf, io::Error),
    #[error("malformed {0:?}: {1}")]
    Format(std::path::PathBuf, serde_json::Error),
}

/// Valid uuids listed in `path`. A missing file is an empty list; invalid
/// uuids are logged and dropped.
pub async fn read_uuid_list(path: &Path) -> Result<BTreeSet<Uuid>, ListError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("list {:?} not found, treated as empty", path);
            return Ok(BTreeSet::new());
        }
        Err(e) => return Err(ListError::Io(path.to_path_buf(), e)),
    };
    let entries: Vec<ListEntry> = serde_json::from_slice(&raw)
        .map_err(|e| ListError::Format(path.to_path_buf(), e))?;
    let mut out = BTreeSet::new();
    for entry in entries {
        match uuid_fmt::parse(entry.uuid.as_str()) {
            Some(uuid) => {
                out.insert(uuid);
            }
            None => tracing::warn!("skip invalid uuid {:?} ({:?}) in {:?}", entry.uuid, entry.name, path),
        }
    }
    Ok(out)
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::integration::{EndpointConfig, TestExample};
use crate::session::EditingSession;

/// On-disk form of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub config: EndpointConfig,
    #[serde(default)]
    pub examples: Vec<TestExample>,
}

impl From<SessionFile> for EditingSession {
    fn from(file: SessionFile) -> Self {
        EditingSession::from_parts(file.config, file.examples)
    }
}

impl From<&EditingSession> for SessionFile {
    fn from(session: &EditingSession) -> Self {
        Self {
            config: session.config.clone(),
            examples: session.examples().to_vec(),
        }
    }
}

pub fn load_session(path: &Path) -> Result<EditingSession, StorageError> {
    let raw = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file: SessionFile = serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), examples = file.examples.len(), "loaded session");
    Ok(file.into())
}

pub fn save_session(path: &Path, session: &EditingSession) -> Result<(), StorageError> {
    let raw = serde_json::to_string_pretty(&SessionFile::from(session)).map_err(StorageError::Serialize)?;
    fs::write(path, raw).map_err(|source| StorageError::Write {
        path: path.display().to_string(),
        source,
    })
}

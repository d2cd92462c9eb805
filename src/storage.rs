//! Task file persistence - the whole store as one JSON object keyed by id

use crate::core::{Task, TaskId, TaskStore};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a valid task file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode tasks for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the store from `path`. A missing file is an empty store.
pub fn load(path: &Path) -> Result<TaskStore, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No task file at {}, starting empty", path.display());
            return Ok(TaskStore::new());
        }
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(TaskStore::new());
    }

    let tasks: BTreeMap<TaskId, Task> =
        serde_json::from_str(&content).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded {} task(s) from {}", tasks.len(), path.display());
    Ok(TaskStore::from_tasks(tasks))
}

/// Overwrite `path` with the whole store, creating parent directories
pub fn save(path: &Path, store: &TaskStore) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(store.tasks()).map_err(|source| {
        StorageError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, json).map_err(io_err)?;
    log::info!("Saved {} task(s) to {}", store.len(), path.display());
    Ok(())
}

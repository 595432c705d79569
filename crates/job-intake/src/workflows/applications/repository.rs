use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use super::domain::{ApplicationId, StoredApplication};

/// Storage abstraction so the intake service can be exercised without touching disk.
pub trait ApplicationRepository: Send + Sync {
    fn append(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError>;
    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{} is not a JSON array of applications: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read every record from a durable file. A missing file holds no records.
pub fn read_records(path: &Path) -> Result<Vec<StoredApplication>, RepositoryError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RepositoryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&raw).map_err(|source| RepositoryError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the durable file with `records`, pretty-printed.
pub fn write_records(path: &Path, records: &[StoredApplication]) -> Result<(), RepositoryError> {
    let write_error = |source| RepositoryError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let encoded = serde_json::to_vec_pretty(records)
        .map_err(|err| write_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    fs::write(path, encoded).map_err(write_error)
}

/// In-memory list of applications mirrored to a single JSON array file.
///
/// Every append rewrites the whole file. Write failures are logged and the record stays in
/// memory, so the process keeps serving it until restart.
pub struct JsonFileRepository {
    path: PathBuf,
    records: Mutex<Vec<StoredApplication>>,
}

impl JsonFileRepository {
    /// Load `path`; an unreadable or malformed file starts the store empty instead of failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(records) => {
                info!(
                    count = records.len(),
                    path = %path.display(),
                    "loaded existing applications"
                );
                records
            }
            Err(err) => {
                warn!(error = %err, "starting with an empty application store");
                Vec::new()
            }
        };

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredApplication>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("application list lock poisoned".to_string()))
    }
}

impl ApplicationRepository for JsonFileRepository {
    fn append(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        let mut records = self.guard()?;
        records.push(record.clone());

        if let Err(err) = write_records(&self.path, &records) {
            warn!(
                error = %err,
                application_id = %record.id,
                "application kept in memory only"
            );
        }
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        let records = self.guard()?;
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        Ok(self.guard()?.clone())
    }
}

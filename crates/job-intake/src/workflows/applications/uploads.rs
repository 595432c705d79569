use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::domain::StoredDocument;
use crate::workflows::validation::DocumentSlot;

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to prepare upload directory {}: {source}", .path.display())]
    Directory { path: PathBuf, source: io::Error },
    #[error("failed to write upload {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to read upload {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Flat directory holding uploaded documents under generated names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| UploadError::Directory {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` as `{part}-{millis}-{sequence}{.ext}` and describe the stored file.
    pub fn store(
        &self,
        slot: DocumentSlot,
        original_name: &str,
        bytes: &[u8],
        millis: u64,
    ) -> Result<StoredDocument, UploadError> {
        let filename = stored_file_name(slot, original_name, millis);
        let path = self.dir.join(&filename);
        fs::write(&path, bytes).map_err(|source| UploadError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(StoredDocument {
            filename,
            original_name: original_name.to_string(),
            size: bytes.len() as u64,
            stored_path: path.display().to_string(),
        })
    }

    /// Bytes of a previously stored file. Names that could escape the directory are never found.
    pub fn open(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError> {
        if !is_plain_file_name(filename) {
            return Ok(None);
        }

        let path = self.dir.join(filename);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(UploadError::Read { path, source }),
        }
    }
}

fn stored_file_name(slot: DocumentSlot, original_name: &str, millis: u64) -> String {
    let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}-{millis}-{sequence}{extension}", slot.field_name())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_carry_part_timestamp_and_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = UploadStore::new(dir.path().join("uploads")).expect("store");

        let first = store
            .store(DocumentSlot::Resume, "My CV.PDF", b"%PDF", 1_700_000_000_000)
            .expect("stored");
        let second = store
            .store(DocumentSlot::CoverLetter, "letter.docx", b"PK", 1_700_000_000_000)
            .expect("stored");

        assert!(first.filename.starts_with("resume-1700000000000-"));
        assert!(first.filename.ends_with(".pdf"));
        assert!(second.filename.starts_with("coverLetter-1700000000000-"));
        assert_ne!(first.filename, second.filename);
        assert_eq!(first.original_name, "My CV.PDF");
        assert_eq!(first.size, 4);
        assert_eq!(first.download_url(), format!("/uploads/{}", first.filename));
        assert_eq!(
            store.open(&first.filename).expect("readable"),
            Some(b"%PDF".to_vec())
        );
    }

    #[test]
    fn unknown_or_escaping_names_are_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("secret.txt"), b"x").expect("write");
        let store = UploadStore::new(dir.path().join("uploads")).expect("store");

        assert_eq!(store.open("missing.pdf").expect("lookup"), None);
        assert_eq!(store.open("../secret.txt").expect("lookup"), None);
        assert_eq!(store.open("..").expect("lookup"), None);
        assert_eq!(store.open("").expect("lookup"), None);
    }
}

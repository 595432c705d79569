use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::workflows::applications::domain::{ApplicationId, StoredApplication};
use crate::workflows::applications::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::applications::service::{ApplicationIntakeService, IncomingDocument};
use crate::workflows::applications::uploads::UploadStore;
use crate::workflows::validation::DocumentSlot;

pub(super) const BOUNDARY: &str = "job-intake-test-boundary";

pub(super) fn application_data() -> String {
    json!({
        "user": {
            "email": "a@b.com",
            "password": "Passw0rd!",
            "createdAt": "2025-03-01T09:30:00Z",
            "origin": "sign_up"
        },
        "formData": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "city": "London",
            "jobTitle1": "Engineer",
            "company1": "Acme",
            "currentWork1": true
        },
        "submissionTime": "2025-03-01T09:45:00Z",
        "status": "submitted"
    })
    .to_string()
}

pub(super) fn document(slot: DocumentSlot, name: &str, content_type: &str, size: usize) -> IncomingDocument {
    IncomingDocument {
        slot,
        file_name: name.to_string(),
        content_type: Some(content_type.to_string()),
        bytes: vec![b'%'; size],
    }
}

pub(super) fn resume(size: usize) -> IncomingDocument {
    document(DocumentSlot::Resume, "cv.pdf", "application/pdf", size)
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<StoredApplication>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("lock").len()
    }
}

impl ApplicationRepository for MemoryRepository {
    fn append(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        self.records.lock().expect("lock").push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .iter()
            .find(|record| &record.id == id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        Ok(self.records.lock().expect("lock").clone())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn append(&self, _record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

/// Holds every `append` until the test releases it, giving up after `patience`.
pub(super) struct GatedRepository {
    inner: MemoryRepository,
    entered: AtomicBool,
    release: Mutex<Receiver<()>>,
    patience: Duration,
}

impl GatedRepository {
    pub(super) fn new(patience: Duration) -> (Self, Sender<()>) {
        let (sender, receiver) = mpsc::channel();
        let repository = Self {
            inner: MemoryRepository::default(),
            entered: AtomicBool::new(false),
            release: Mutex::new(receiver),
            patience,
        };
        (repository, sender)
    }

    pub(super) fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }
}

impl ApplicationRepository for GatedRepository {
    fn append(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        self.entered.store(true, Ordering::SeqCst);
        let released = self.release.lock().expect("lock").recv_timeout(self.patience);
        match released {
            Ok(()) => self.inner.append(record),
            Err(_) => Err(RepositoryError::Unavailable("append never released".to_string())),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        self.inner.list()
    }
}

pub(super) struct TestStore<R> {
    pub(super) service: Arc<ApplicationIntakeService<R>>,
    pub(super) repository: Arc<R>,
    pub(super) uploads: TempDir,
}

pub(super) fn build_service() -> TestStore<MemoryRepository> {
    build_service_with(Arc::new(MemoryRepository::default()))
}

pub(super) fn build_service_with<R>(repository: Arc<R>) -> TestStore<R>
where
    R: ApplicationRepository + 'static,
{
    let uploads = tempfile::tempdir().expect("tempdir");
    let store = UploadStore::new(uploads.path()).expect("upload store");
    let service = Arc::new(ApplicationIntakeService::new(
        repository.clone(),
        Arc::new(store),
    ));
    TestStore {
        service,
        repository,
        uploads,
    }
}

/// One multipart part: `(name, filename, content type, bytes)`.
pub(super) type Part<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Vec<u8>);

pub(super) fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

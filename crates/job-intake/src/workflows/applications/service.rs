use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use super::domain::{
    ApplicationId, ApplicationStatus, StoredApplication, StoredDocument, SubmissionEnvelope,
};
use super::export::{build_export, ExportDocument};
use super::repository::{ApplicationRepository, RepositoryError};
use super::uploads::{UploadError, UploadStore};
use crate::workflows::form::FileReference;
use crate::workflows::validation::{validate_file, DocumentSlot, UploadRejection};

/// Document received in a multipart part, fully buffered.
#[derive(Clone)]
pub struct IncomingDocument {
    pub slot: DocumentSlot,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingDocument {
    pub fn reference(&self) -> FileReference {
        FileReference {
            name: self.file_name.clone(),
            size: self.bytes.len() as u64,
            content_type: self.content_type.clone(),
        }
    }
}

impl std::fmt::Debug for IncomingDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingDocument")
            .field("slot", &self.slot)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Issues `APP-` ids from wall-clock milliseconds, never the same one twice.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: Mutex<u64>,
}

impl IdGenerator {
    /// Returns the id and the millisecond stamp it encodes. A stamp at or before the previous
    /// one is bumped past it.
    pub fn next(&self, now_millis: u64) -> Result<(ApplicationId, u64), RepositoryError> {
        let mut last = self
            .last_millis
            .lock()
            .map_err(|_| RepositoryError::Unavailable("id generator lock poisoned".to_string()))?;
        let millis = now_millis.max(*last + 1);
        *last = millis;
        Ok((ApplicationId::from_millis(millis), millis))
    }
}

/// Server side of the wizard: validates submissions, stores their documents and records, and
/// serves them back.
pub struct ApplicationIntakeService<R> {
    repository: Arc<R>,
    uploads: Arc<UploadStore>,
    ids: IdGenerator,
}

impl<R> ApplicationIntakeService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, uploads: Arc<UploadStore>) -> Self {
        Self {
            repository,
            uploads,
            ids: IdGenerator::default(),
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Accept one submission: parse, validate every document, store, then append the record.
    pub fn submit(
        &self,
        application_data: &str,
        documents: Vec<IncomingDocument>,
    ) -> Result<StoredApplication, IntakeServiceError> {
        self.submit_at(application_data, documents, Utc::now())
    }

    pub(crate) fn submit_at(
        &self,
        application_data: &str,
        documents: Vec<IncomingDocument>,
        now: DateTime<Utc>,
    ) -> Result<StoredApplication, IntakeServiceError> {
        let envelope: SubmissionEnvelope = serde_json::from_str(application_data)
            .map_err(|err| IntakeServiceError::InvalidPayload(err.to_string()))?;

        let documents = DocumentSet::collect(documents)?;
        documents.validate().inspect_err(|rejection| {
            warn!(reason = %rejection, "upload rejected");
        })?;

        let now_millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let (id, millis) = self.ids.next(now_millis)?;
        let submission_time = i64::try_from(millis)
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or(now);

        let record = StoredApplication {
            id,
            account: envelope.user,
            fields: envelope.form_data,
            resume: self.store_document(documents.resume.as_ref(), millis)?,
            transcript: self.store_document(documents.transcript.as_ref(), millis)?,
            cover_letter: self.store_document(documents.cover_letter.as_ref(), millis)?,
            submission_time,
            status: ApplicationStatus::Submitted,
        };

        let stored = self.repository.append(record)?;
        info!(
            application_id = %stored.id,
            documents = documents.len(),
            "application submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<StoredApplication, IntakeServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| IntakeServiceError::NotFound(id.clone()))
    }

    pub fn list(&self) -> Result<Vec<StoredApplication>, IntakeServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn export(&self, exported_at: DateTime<Utc>) -> Result<ExportDocument, IntakeServiceError> {
        let records = self.repository.list()?;
        Ok(build_export(&records, exported_at))
    }

    fn store_document(
        &self,
        document: Option<&IncomingDocument>,
        millis: u64,
    ) -> Result<Option<StoredDocument>, IntakeServiceError> {
        let Some(document) = document else {
            return Ok(None);
        };
        let stored =
            self.uploads
                .store(document.slot, &document.file_name, &document.bytes, millis)?;
        Ok(Some(stored))
    }
}

/// At most one document per slot.
struct DocumentSet {
    resume: Option<IncomingDocument>,
    transcript: Option<IncomingDocument>,
    cover_letter: Option<IncomingDocument>,
}

impl DocumentSet {
    fn collect(documents: Vec<IncomingDocument>) -> Result<Self, IntakeServiceError> {
        let mut set = Self {
            resume: None,
            transcript: None,
            cover_letter: None,
        };
        for document in documents {
            let slot = document.slot;
            let target = match slot {
                DocumentSlot::Resume => &mut set.resume,
                DocumentSlot::Transcript => &mut set.transcript,
                DocumentSlot::CoverLetter => &mut set.cover_letter,
            };
            if target.replace(document).is_some() {
                return Err(IntakeServiceError::InvalidPayload(format!(
                    "more than one {slot} was uploaded"
                )));
            }
        }
        Ok(set)
    }

    /// The resume is mandatory; the other documents are checked only when present.
    fn validate(&self) -> Result<(), UploadRejection> {
        let resume = self.resume.as_ref().map(IncomingDocument::reference);
        validate_file(resume.as_ref(), DocumentSlot::Resume)?;
        for document in [&self.transcript, &self.cover_letter].into_iter().flatten() {
            validate_file(Some(&document.reference()), document.slot)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        [&self.resume, &self.transcript, &self.cover_letter]
            .into_iter()
            .flatten()
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("invalid application data: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Rejected(#[from] UploadRejection),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

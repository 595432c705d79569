//! Server-side application store: multipart intake, durable JSON list, export, and uploads.

pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod service;
pub mod uploads;

#[cfg(test)]
mod tests;

pub use domain::{
    AccountIdentity, AccountOrigin, ApplicationId, ApplicationStatus, StoredApplication,
    StoredDocument, SubmissionEnvelope, SubmitResponse, APPLICATION_DATA_PART,
};
pub use export::{build_export, ExportDocument};
pub use repository::{
    read_records, write_records, ApplicationRepository, JsonFileRepository, RepositoryError,
};
pub use router::application_router;
pub use service::{ApplicationIntakeService, IdGenerator, IncomingDocument, IntakeServiceError};
pub use uploads::{UploadError, UploadStore};

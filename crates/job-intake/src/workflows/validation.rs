//! Field, password, and document checks shared by the wizard and the application store.
//!
//! Every check is a pure function. The wizard runs them for immediate feedback; the store runs
//! [`validate_file`] again on the uploaded bytes because client-side checks can be bypassed.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::form::{FieldMap, FileReference};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Characters that satisfy the symbol requirement of the password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

const MIN_PASSWORD_LENGTH: usize = 8;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

const ALLOWED_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// One independent rule of the password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRequirement {
    MinimumLength,
    Digit,
    Letter,
    Lowercase,
    Uppercase,
    Symbol,
}

impl PasswordRequirement {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::MinimumLength,
            Self::Digit,
            Self::Letter,
            Self::Lowercase,
            Self::Uppercase,
            Self::Symbol,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::MinimumLength => "at least 8 characters",
            Self::Digit => "a number",
            Self::Letter => "a letter",
            Self::Lowercase => "a lowercase letter",
            Self::Uppercase => "an uppercase letter",
            Self::Symbol => "a special character",
        }
    }

    pub fn is_met_by(self, password: &str) -> bool {
        match self {
            Self::MinimumLength => password.chars().count() >= MIN_PASSWORD_LENGTH,
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::Letter => password.chars().any(|c| c.is_ascii_alphabetic()),
            Self::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            Self::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            Self::Symbol => password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)),
        }
    }
}

/// Which document slot an upload fills; used in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSlot {
    Resume,
    Transcript,
    CoverLetter,
}

impl DocumentSlot {
    pub const fn ordered() -> [Self; 3] {
        [Self::Resume, Self::Transcript, Self::CoverLetter]
    }

    /// Multipart part name carrying this document.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Transcript => "transcript",
            Self::CoverLetter => "coverLetter",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Transcript => "transcript",
            Self::CoverLetter => "cover letter",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|slot| slot.field_name() == name)
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a document is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("please upload your {slot}")]
    Missing { slot: DocumentSlot },
    #[error("{slot} file size must be less than 5MB (received {size} bytes)")]
    TooLarge { slot: DocumentSlot, size: u64 },
    #[error("{slot} must be a PDF, DOC, or DOCX file (received '{file_name}')")]
    UnsupportedType {
        slot: DocumentSlot,
        file_name: String,
        content_type: Option<String>,
    },
}

/// Failures surfaced to the applicant without advancing the wizard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("password does not meet requirements: needs {}", describe_unmet(.unmet))]
    WeakPassword { unmet: Vec<PasswordRequirement> },
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("please agree to the terms to create an account")]
    TermsNotAccepted,
    #[error("please fill in all required fields: {}", .missing.join(", "))]
    MissingFields { missing: Vec<String> },
    #[error("cannot delete the first work experience")]
    PermanentExperience,
    #[error("work experience {id} is marked as current and has no end date")]
    EndDateLocked { id: u32 },
    #[error(transparent)]
    Upload(#[from] UploadRejection),
}

fn describe_unmet(unmet: &[PasswordRequirement]) -> String {
    unmet
        .iter()
        .map(|requirement| requirement.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every requirement `password` fails, in policy order.
pub fn unmet_password_requirements(password: &str) -> Vec<PasswordRequirement> {
    PasswordRequirement::ordered()
        .into_iter()
        .filter(|requirement| !requirement.is_met_by(password))
        .collect()
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let unmet = unmet_password_requirements(password);
    if unmet.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword { unmet })
    }
}

/// Names from `required` that are absent or blank in `fields`, in `required` order.
pub fn missing_fields(fields: &FieldMap, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| fields.get(**name).map_or(true, |value| value.is_blank()))
        .map(|name| name.to_string())
        .collect()
}

pub fn validate_required_fields(fields: &FieldMap, required: &[&str]) -> Result<(), ValidationError> {
    let missing = missing_fields(fields, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { missing })
    }
}

/// Check presence, size, and type of a document destined for `slot`.
pub fn validate_file(
    file: Option<&FileReference>,
    slot: DocumentSlot,
) -> Result<(), UploadRejection> {
    let file = file.ok_or(UploadRejection::Missing { slot })?;

    if file.size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            slot,
            size: file.size,
        });
    }

    if !has_allowed_extension(&file.name) || !has_allowed_content_type(file) {
        return Err(UploadRejection::UnsupportedType {
            slot,
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
        });
    }

    Ok(())
}

fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// A missing or generic declared type falls back to the type implied by the file name.
fn has_allowed_content_type(file: &FileReference) -> bool {
    let declared = file
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let mime = match declared {
        Some(raw) => match raw.parse::<mime::Mime>() {
            Ok(parsed) if parsed == mime::APPLICATION_OCTET_STREAM => guess_mime(&file.name),
            Ok(parsed) => Some(parsed),
            Err(_) => None,
        },
        None => guess_mime(&file.name),
    };

    mime.is_some_and(|mime| ALLOWED_CONTENT_TYPES.contains(&mime.essence_str()))
}

fn guess_mime(file_name: &str) -> Option<mime::Mime> {
    mime_guess::from_path(file_name).first()
}

/// Canonical content type for an accepted document name, used when sending uploads.
pub fn content_type_for(file_name: &str) -> String {
    guess_mime(file_name)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string())
}

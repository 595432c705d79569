use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::form::FieldMap;

/// Identifier wrapper for submitted applications (`APP-` followed by an uppercase base36 stamp).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub const PREFIX: &'static str = "APP-";

    pub fn from_millis(millis: u64) -> Self {
        Self(format!("{}{}", Self::PREFIX, to_base36_upper(millis)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id has the `APP-[0-9A-Z]+` shape.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(Self::PREFIX)
            .is_some_and(|stamp| {
                !stamp.is_empty()
                    && stamp
                        .chars()
                        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            })
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36_upper(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// How the applicant established their identity on the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountOrigin {
    SignUp,
    SignIn,
}

/// Account captured on the first step. The password is kept verbatim; see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "signupTime", alias = "loginTime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<AccountOrigin>,
}

/// Lifecycle of a stored application. Records are never updated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
        }
    }
}

/// Multipart part holding the JSON envelope.
pub const APPLICATION_DATA_PART: &str = "applicationData";

/// JSON carried in the `applicationData` multipart part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEnvelope {
    #[serde(default)]
    pub user: Option<AccountIdentity>,
    #[serde(default)]
    pub form_data: FieldMap,
    #[serde(default)]
    pub submission_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

/// Metadata for a document written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    #[serde(rename = "path")]
    pub stored_path: String,
}

impl StoredDocument {
    pub fn download_url(&self) -> String {
        format!("/uploads/{}", self.filename)
    }
}

/// Durable record created once per accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApplication {
    pub id: ApplicationId,
    #[serde(rename = "user", default)]
    pub account: Option<AccountIdentity>,
    #[serde(rename = "formData", default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub resume: Option<StoredDocument>,
    #[serde(default)]
    pub transcript: Option<StoredDocument>,
    #[serde(default)]
    pub cover_letter: Option<StoredDocument>,
    pub submission_time: DateTime<Utc>,
    pub status: ApplicationStatus,
}

/// Body returned by the submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(id: ApplicationId) -> Self {
        Self {
            success: true,
            application_id: Some(id),
            message: Some("Application submitted successfully".to_string()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            application_id: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_use_uppercase_base36_stamp() {
        assert_eq!(ApplicationId::from_millis(0).as_str(), "APP-0");
        assert_eq!(ApplicationId::from_millis(35).as_str(), "APP-Z");
        assert_eq!(ApplicationId::from_millis(36).as_str(), "APP-10");
        let id = ApplicationId::from_millis(1_700_000_000_000);
        assert_eq!(id.as_str(), "APP-LOYW3V28");
        assert!(id.is_well_formed());
        assert!(!ApplicationId("APP-abc".to_string()).is_well_formed());
        assert!(!ApplicationId("APP-".to_string()).is_well_formed());
    }

    #[test]
    fn account_accepts_legacy_timestamp_keys() {
        let account: AccountIdentity = serde_json::from_value(json!({
            "email": "a@b.com",
            "password": "Passw0rd!",
            "signupTime": "2025-01-02T03:04:05Z"
        }))
        .expect("legacy account parses");
        assert!(account.created_at.is_some());
        assert!(account.origin.is_none());
    }

    #[test]
    fn stored_application_uses_wire_keys() {
        let record = StoredApplication {
            id: ApplicationId("APP-1".to_string()),
            account: None,
            fields: FieldMap::new(),
            resume: Some(StoredDocument {
                filename: "resume-1-1.pdf".to_string(),
                original_name: "cv.pdf".to_string(),
                size: 10,
                stored_path: "uploads/resume-1-1.pdf".to_string(),
            }),
            transcript: None,
            cover_letter: None,
            submission_time: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .expect("valid timestamp")
                .with_timezone(&Utc),
            status: ApplicationStatus::Submitted,
        };

        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value["id"], "APP-1");
        assert_eq!(value["user"], serde_json::Value::Null);
        assert!(value["formData"].is_object());
        assert_eq!(value["resume"]["originalName"], "cv.pdf");
        assert_eq!(value["resume"]["path"], "uploads/resume-1-1.pdf");
        assert_eq!(value["coverLetter"], serde_json::Value::Null);
        assert_eq!(value["status"], "submitted");
    }
}

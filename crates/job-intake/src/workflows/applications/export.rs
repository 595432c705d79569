//! Flat, human-oriented export of every stored application.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::domain::{AccountIdentity, ApplicationId, StoredApplication, StoredDocument};
use crate::workflows::form::{display_or, joined_address, FieldMap, FieldValue};

const NOT_AVAILABLE: &str = "N/A";
const EXPORT_VERSION: &str = "1.0";
const EXPORTED_BY: &str = "Server API";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_info: ExportInfo,
    pub applications: Vec<ExportedApplication>,
}

impl ExportDocument {
    /// Attachment name used by the download endpoint.
    pub fn file_name(&self) -> String {
        format!(
            "job-applications-export-{}.json",
            self.export_info.export_date.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInfo {
    pub export_date: DateTime<Utc>,
    pub total_applications: usize,
    pub exported_by: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedApplication {
    pub application_id: ApplicationId,
    pub submission_time: DateTime<Utc>,
    pub status: &'static str,
    pub account_info: AccountInfo,
    pub personal_info: PersonalInfo,
    pub address: AddressInfo,
    pub work_experience: WorkExperienceInfo,
    pub resume: DocumentInfo,
    pub transcript: DocumentInfo,
    pub cover_letter: DocumentInfo,
    pub application_questions: ApplicationQuestions,
    pub behavioral_assessment: BehavioralAssessment,
    pub voluntary_disclosures: VoluntaryDisclosures,
    pub disability_info: DisabilityInfo,
    pub raw_form_data: FieldMap,
    pub raw_user_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub email: String,
    pub password: String,
    pub account_created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub unit_number: String,
    pub street_address: String,
    pub city: String,
    pub country: String,
    pub pin_code: String,
    pub full_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceInfo {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub currently_working: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub role_description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub uploaded: &'static str,
    pub file_name: String,
    pub file_size: String,
    pub server_file_name: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuestions {
    pub meets_basic_requirements: String,
    pub work_authorization: String,
    pub sponsorship_required: String,
    pub opt_training: String,
    pub years_of_experience: String,
    pub previous_employee: String,
    pub background_check_consent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralAssessment {
    pub passion: String,
    pub working_with_difficult_people: String,
    pub time_management: String,
    pub overcoming_challenges_and_setbacks: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoluntaryDisclosures {
    pub veteran_status: String,
    pub gender: String,
    pub hispanic: String,
    pub race: String,
    pub consent_to_terms: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabilityInfo {
    pub language: String,
    pub disability_name: String,
    pub disability_date: String,
    pub disability_status: String,
    pub employee_id: String,
}

/// Reshape `records` into the export schema, stamped with `exported_at`.
pub fn build_export(records: &[StoredApplication], exported_at: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        export_info: ExportInfo {
            export_date: exported_at,
            total_applications: records.len(),
            exported_by: EXPORTED_BY,
            version: EXPORT_VERSION,
        },
        applications: records.iter().map(export_application).collect(),
    }
}

fn export_application(record: &StoredApplication) -> ExportedApplication {
    let fields = &record.fields;
    let na = |name: &str| display_or(fields, name, NOT_AVAILABLE);
    let currently_working = is_checked(fields, "currentWork1");

    ExportedApplication {
        application_id: record.id.clone(),
        submission_time: record.submission_time,
        status: record.status.label(),
        account_info: account_info(record.account.as_ref()),
        personal_info: PersonalInfo {
            first_name: na("firstName"),
            last_name: na("lastName"),
            phone: na("phone"),
            linkedin: na("linkedin"),
            github: na("github"),
        },
        address: AddressInfo {
            unit_number: na("unitNumber"),
            street_address: na("streetAddress"),
            city: na("city"),
            country: na("country"),
            pin_code: na("pinCode"),
            full_address: joined_address(fields),
        },
        work_experience: WorkExperienceInfo {
            job_title: na("jobTitle1"),
            company: na("company1"),
            location: na("location1"),
            currently_working: yes_no(currently_working),
            start_date: na("fromDate1"),
            end_date: fields
                .get("toDate1")
                .and_then(FieldValue::as_display)
                .unwrap_or_else(|| {
                    if currently_working {
                        "Present".to_string()
                    } else {
                        NOT_AVAILABLE.to_string()
                    }
                }),
            role_description: na("roleDescription1"),
        },
        resume: document_info(record.resume.as_ref()),
        transcript: document_info(record.transcript.as_ref()),
        cover_letter: document_info(record.cover_letter.as_ref()),
        application_questions: ApplicationQuestions {
            meets_basic_requirements: na("basicRequirements"),
            work_authorization: na("workAuthorized"),
            sponsorship_required: na("sponsorshipRequired"),
            opt_training: na("optTraining"),
            years_of_experience: na("yearsExperience"),
            previous_employee: na("previousKLA"),
            background_check_consent: na("backgroundCheck"),
        },
        behavioral_assessment: BehavioralAssessment {
            passion: na("passion"),
            working_with_difficult_people: na("difficultPeople"),
            time_management: na("timeManagement"),
            overcoming_challenges_and_setbacks: na("resilienceType"),
        },
        voluntary_disclosures: VoluntaryDisclosures {
            veteran_status: na("veteranStatus"),
            gender: na("gender"),
            hispanic: na("hispanic"),
            race: na("race"),
            consent_to_terms: yes_no(is_checked(fields, "consentTerms")),
        },
        disability_info: DisabilityInfo {
            language: na("language"),
            disability_name: na("disabilityName"),
            disability_date: na("disabilityDate"),
            disability_status: na("disabilityStatus"),
            employee_id: na("employeeId"),
        },
        raw_form_data: fields.clone(),
        raw_user_data: record
            .account
            .as_ref()
            .and_then(|account| serde_json::to_value(account).ok())
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
    }
}

fn account_info(account: Option<&AccountIdentity>) -> AccountInfo {
    let non_empty = |value: &str| {
        if value.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            value.to_string()
        }
    };

    match account {
        Some(account) => AccountInfo {
            email: non_empty(&account.email),
            password: non_empty(&account.password),
            account_created: account
                .created_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        },
        None => AccountInfo {
            email: NOT_AVAILABLE.to_string(),
            password: NOT_AVAILABLE.to_string(),
            account_created: NOT_AVAILABLE.to_string(),
        },
    }
}

fn document_info(document: Option<&StoredDocument>) -> DocumentInfo {
    match document {
        Some(document) => DocumentInfo {
            uploaded: "Yes",
            file_name: document.original_name.clone(),
            file_size: format_kilobytes(document.size),
            server_file_name: document.filename.clone(),
            download_url: document.download_url(),
        },
        None => DocumentInfo {
            uploaded: "No",
            file_name: NOT_AVAILABLE.to_string(),
            file_size: NOT_AVAILABLE.to_string(),
            server_file_name: NOT_AVAILABLE.to_string(),
            download_url: NOT_AVAILABLE.to_string(),
        },
    }
}

/// `2048` becomes `"2.0 KB"`; an empty file has no meaningful size.
fn format_kilobytes(size: u64) -> String {
    if size == 0 {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{:.1} KB", size as f64 / 1024.0)
    }
}

fn is_checked(fields: &FieldMap, name: &str) -> bool {
    fields.get(name).is_some_and(|value| !value.is_blank())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applications::domain::ApplicationStatus;
    use chrono::TimeZone;

    fn record() -> StoredApplication {
        let mut fields = FieldMap::new();
        fields.insert("firstName".to_string(), FieldValue::text("Ada"));
        fields.insert("unitNumber".to_string(), FieldValue::text("4B"));
        fields.insert("city".to_string(), FieldValue::text("Pune"));
        fields.insert("jobTitle1".to_string(), FieldValue::text("Engineer"));
        fields.insert("currentWork1".to_string(), FieldValue::Flag(true));
        fields.insert("consentTerms".to_string(), FieldValue::Flag(true));

        StoredApplication {
            id: ApplicationId::from_millis(1_700_000_000_000),
            account: Some(AccountIdentity {
                email: "a@b.com".to_string(),
                password: "Passw0rd!".to_string(),
                created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()),
                origin: None,
            }),
            fields,
            resume: Some(StoredDocument {
                filename: "resume-1700000000000-1.pdf".to_string(),
                original_name: "cv.pdf".to_string(),
                size: 2048,
                stored_path: "uploads/resume-1700000000000-1.pdf".to_string(),
            }),
            transcript: None,
            cover_letter: None,
            submission_time: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            status: ApplicationStatus::Submitted,
        }
    }

    #[test]
    fn export_flattens_records_with_placeholders() {
        let exported_at = Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap();
        let export = build_export(&[record()], exported_at);
        let value = serde_json::to_value(&export).expect("serializes");

        assert_eq!(value["exportInfo"]["totalApplications"], 1);
        assert_eq!(value["exportInfo"]["exportedBy"], "Server API");
        assert_eq!(value["exportInfo"]["version"], "1.0");

        let app = &value["applications"][0];
        assert_eq!(app["applicationId"], "APP-LOYW3V28");
        assert_eq!(app["status"], "submitted");
        assert_eq!(app["accountInfo"]["email"], "a@b.com");
        assert_eq!(app["accountInfo"]["accountCreated"], "2025-03-01T09:30:00.000Z");
        assert_eq!(app["personalInfo"]["firstName"], "Ada");
        assert_eq!(app["personalInfo"]["lastName"], "N/A");
        assert_eq!(app["address"]["fullAddress"], "4B, Pune");
        assert_eq!(app["workExperience"]["currentlyWorking"], "Yes");
        assert_eq!(app["workExperience"]["endDate"], "Present");
        assert_eq!(app["resume"]["uploaded"], "Yes");
        assert_eq!(app["resume"]["fileSize"], "2.0 KB");
        assert_eq!(
            app["resume"]["downloadUrl"],
            "/uploads/resume-1700000000000-1.pdf"
        );
        assert_eq!(app["transcript"]["uploaded"], "No");
        assert_eq!(app["transcript"]["downloadUrl"], "N/A");
        assert_eq!(app["voluntaryDisclosures"]["consentToTerms"], "Yes");
        assert_eq!(app["voluntaryDisclosures"]["gender"], "N/A");
        assert_eq!(app["rawFormData"]["firstName"], "Ada");
        assert_eq!(app["rawUserData"]["email"], "a@b.com");

        assert_eq!(export.file_name(), "job-applications-export-2025-03-02.json");
    }

    #[test]
    fn records_without_account_export_placeholders() {
        let mut bare = record();
        bare.account = None;
        bare.fields.clear();
        let export = build_export(&[bare], Utc::now());
        let app = &export.applications[0];

        assert_eq!(app.account_info.email, "N/A");
        assert_eq!(app.account_info.account_created, "N/A");
        assert_eq!(app.work_experience.end_date, "N/A");
        assert_eq!(app.work_experience.currently_working, "No");
        assert_eq!(app.address.full_address, "");
        assert_eq!(app.raw_user_data, serde_json::json!({}));
    }
}

use std::sync::Mutex;

use serde_json::json;

use crate::workflows::form::{FieldMap, FieldValue};
use crate::workflows::wizard::{
    ExperiencePatch, Notice, ResumeUpload, Section, SignUpForm, SubmissionRequest,
    SubmissionTransport, TransportError, TransportResponse, WizardPresenter, WizardSession,
    WizardStep, FIRST_ENTRY_ID,
};

pub(super) const PASSWORD: &str = "Passw0rd!";

pub(super) fn sign_up_form() -> SignUpForm {
    SignUpForm {
        email: "a@b.com".to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        agree_terms: true,
    }
}

pub(super) fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::text(*value)))
        .collect()
}

pub(super) fn personal_info() -> FieldMap {
    fields(&[
        ("firstName", "Ada"),
        ("lastName", "Lovelace"),
        ("phone", "555-0100"),
        ("unitNumber", "4B"),
        ("streetAddress", "12 Analytical Way"),
        ("city", "London"),
        ("country", "UK"),
        ("pinCode", "N1 9GU"),
    ])
}

pub(super) fn questions() -> FieldMap {
    fields(&[
        ("basicRequirements", "yes"),
        ("workAuthorized", "yes"),
        ("sponsorshipRequired", "no"),
        ("optTraining", "no"),
        ("yearsExperience", "5"),
        ("previousKLA", "no"),
        ("backgroundCheck", "yes"),
        ("passion", "Engines"),
        ("difficultPeople", "Listen first"),
        ("timeManagement", "Lists"),
        ("resilienceType", "steady"),
    ])
}

pub(super) fn disclosures() -> FieldMap {
    let mut map = fields(&[("veteranStatus", "not-veteran"), ("race", "prefer-not")]);
    map.insert("consentTerms".to_string(), FieldValue::Flag(true));
    map
}

pub(super) fn self_identify() -> FieldMap {
    fields(&[
        ("language", "English"),
        ("disabilityName", "Ada Lovelace"),
        ("disabilityDate", "2025-01-15"),
        ("disabilityStatus", "no"),
    ])
}

pub(super) fn pdf_upload(size: usize) -> ResumeUpload {
    ResumeUpload::new("resume.pdf", Some("application/pdf"), vec![b'%'; size])
}

pub(super) fn fill_first_experience(session: &mut WizardSession) {
    session
        .edit_experience(
            FIRST_ENTRY_ID,
            ExperiencePatch {
                job_title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                from_date: Some("2020-01".to_string()),
                ..ExperiencePatch::default()
            },
        )
        .expect("first entry editable");
}

/// Walk a fresh session through steps 1 to 6 with valid data.
pub(super) fn session_at_review() -> WizardSession {
    let mut session = WizardSession::new();
    session.sign_up(sign_up_form()).expect("sign up");
    session
        .submit_step(WizardStep::PersonalInfo, personal_info())
        .expect("personal info");
    fill_first_experience(&mut session);
    session
        .attach_resume(pdf_upload(2048))
        .expect("resume attaches");
    session
        .submit_step(WizardStep::Experience, FieldMap::new())
        .expect("experience");
    session
        .submit_step(WizardStep::Questions, questions())
        .expect("questions");
    session
        .submit_step(WizardStep::Disclosures, disclosures())
        .expect("disclosures");
    session
        .submit_step(WizardStep::SelfIdentify, self_identify())
        .expect("self identify");
    session
}

/// Transport that records requests and answers with a canned response.
pub(super) struct ScriptedTransport {
    reply: Result<TransportResponse, TransportError>,
    sent: Mutex<Vec<SubmissionRequest>>,
}

impl ScriptedTransport {
    pub(super) fn replying(status: u16, body: serde_json::Value) -> Self {
        Self::with_reply(Ok(TransportResponse {
            status,
            body: body.to_string().into_bytes(),
        }))
    }

    pub(super) fn accepting(id: &str) -> Self {
        Self::replying(
            200,
            json!({ "success": true, "applicationId": id, "message": "Application submitted successfully" }),
        )
    }

    pub(super) fn with_reply(reply: Result<TransportResponse, TransportError>) -> Self {
        Self {
            reply,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn sent(&self) -> Vec<SubmissionRequest> {
        self.sent.lock().expect("lock").clone()
    }
}

impl SubmissionTransport for ScriptedTransport {
    fn send(&self, request: SubmissionRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().expect("lock").push(request);
        self.reply.clone()
    }
}

#[derive(Default)]
pub(super) struct RecordingPresenter {
    pub(super) sections: Vec<Section>,
    pub(super) notices: Vec<Notice>,
}

impl WizardPresenter for RecordingPresenter {
    fn show_section(&mut self, section: Section, _session: &WizardSession) {
        self.sections.push(section);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

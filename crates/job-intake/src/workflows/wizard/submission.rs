use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ResumeUpload, WizardStep};
use super::machine::WizardSession;
use crate::workflows::applications::domain::{
    ApplicationId, ApplicationStatus, SubmissionEnvelope, SubmitResponse, APPLICATION_DATA_PART,
};
use crate::workflows::validation::content_type_for;

/// Everything sent for one submission attempt.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub application_data: String,
    pub resume: Option<ResumeUpload>,
}

/// Raw server reply: status code plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("failed to configure HTTP client: {0}")]
    Setup(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Delivers a multipart submission to the application store.
pub trait SubmissionTransport: Send + Sync {
    fn send(&self, request: SubmissionRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("the application can only be submitted from the review step")]
    NotAtReview,
    #[error("could not encode application data: {0}")]
    Encoding(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("submission rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response from server: {0}")]
    MalformedResponse(String),
}

/// Final step of the wizard: posts the draft and, on success, moves the session to its terminal
/// state.
pub struct SubmissionClient<T> {
    transport: T,
}

impl<T> SubmissionClient<T>
where
    T: SubmissionTransport,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit the session's draft. Any failure leaves the session on the review step with its
    /// draft intact so the applicant can retry.
    pub fn submit(&self, session: &mut WizardSession) -> Result<ApplicationId, SubmissionError> {
        let request = build_request(session)?;
        let response = self.transport.send(request).inspect_err(|err| {
            warn!(error = %err, "application submission did not reach the server");
        })?;

        let id = interpret_response(&response)?;
        session
            .complete(id.clone())
            .map_err(|_| SubmissionError::NotAtReview)?;
        info!(application_id = %id, "application submitted");
        Ok(id)
    }
}

/// Assemble the multipart contents for a session waiting on the review step.
pub fn build_request(session: &WizardSession) -> Result<SubmissionRequest, SubmissionError> {
    if session.current_step() != Some(WizardStep::Review) {
        return Err(SubmissionError::NotAtReview);
    }

    let draft = session.draft();
    let envelope = SubmissionEnvelope {
        user: draft.account.clone(),
        form_data: draft.fields.clone(),
        submission_time: Some(Utc::now()),
        status: Some(ApplicationStatus::Submitted),
    };
    let application_data = serde_json::to_string(&envelope)
        .map_err(|err| SubmissionError::Encoding(err.to_string()))?;

    Ok(SubmissionRequest {
        application_data,
        resume: session.resume().cloned(),
    })
}

fn interpret_response(response: &TransportResponse) -> Result<ApplicationId, SubmissionError> {
    let parsed = serde_json::from_slice::<SubmitResponse>(&response.body);

    if !response.is_success() {
        let message = parsed
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "Submission failed".to_string());
        warn!(status = response.status, %message, "application submission rejected");
        return Err(SubmissionError::Rejected {
            status: response.status,
            message,
        });
    }

    let body = parsed.map_err(|err| SubmissionError::MalformedResponse(err.to_string()))?;
    if !body.success {
        return Err(SubmissionError::Rejected {
            status: response.status,
            message: body
                .message
                .unwrap_or_else(|| "Submission failed".to_string()),
        });
    }

    match body.application_id {
        Some(id) if id.is_well_formed() => Ok(id),
        Some(id) => Err(SubmissionError::MalformedResponse(format!(
            "application id '{id}' is not valid"
        ))),
        None => Err(SubmissionError::MalformedResponse(
            "response did not include an application id".to_string(),
        )),
    }
}

/// Blocking multipart transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSubmissionTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSubmissionTransport {
    /// Requests run without a client-side timeout; a hung server leaves the caller waiting.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, None)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Setup(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SubmissionTransport for HttpSubmissionTransport {
    fn send(&self, request: SubmissionRequest) -> Result<TransportResponse, TransportError> {
        let mut form = reqwest::blocking::multipart::Form::new()
            .text(APPLICATION_DATA_PART, request.application_data);

        if let Some(resume) = request.resume {
            let content_type = resume
                .content_type
                .clone()
                .unwrap_or_else(|| content_type_for(&resume.file_name));
            let part = reqwest::blocking::multipart::Part::bytes(resume.bytes)
                .file_name(resume.file_name)
                .mime_str(&content_type)
                .map_err(|err| TransportError::Setup(err.to_string()))?;
            form = form.part("resume", part);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| TransportError::Network(err.to_string()))?
            .to_vec();

        Ok(TransportResponse { status, body })
    }
}

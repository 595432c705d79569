use clap::Args;
use job_intake::error::AppError;
use job_intake::workflows::applications::ApplicationId;
use job_intake::workflows::form::FieldMap;
use job_intake::workflows::wizard::{
    ExperiencePatch, HttpSubmissionTransport, Notice, NoticeLevel, ResumeUpload, Section,
    SignInForm, SignUpForm, SubmissionClient, SubmissionError, SubmissionTransport, WizardController,
    WizardPresenter, WizardSession, WizardStep, FIRST_ENTRY_ID,
};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/submit-application";

#[derive(Args, Debug)]
pub(crate) struct WalkthroughArgs {
    /// JSON file with the answers for every wizard step
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Resume document to attach (PDF, DOC, or DOCX)
    #[arg(long)]
    pub(crate) resume: PathBuf,
    /// Submission endpoint of a running intake service
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub(crate) endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub(crate) enum AccountAnswers {
    #[serde(rename_all = "camelCase")]
    SignUp {
        email: String,
        password: String,
        #[serde(default)]
        confirm_password: Option<String>,
        #[serde(default)]
        agree_terms: bool,
    },
    SignIn { email: String, password: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ExperienceAnswers {
    pub(crate) job_title: String,
    pub(crate) company: String,
    pub(crate) location: String,
    pub(crate) currently_employed: bool,
    pub(crate) from_date: String,
    pub(crate) to_date: String,
    pub(crate) description: String,
}

/// Answers for every step, as a recruiter would type them into the browser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WalkthroughAnswers {
    pub(crate) account: AccountAnswers,
    #[serde(default)]
    pub(crate) personal_info: FieldMap,
    #[serde(default)]
    pub(crate) experience: Vec<ExperienceAnswers>,
    #[serde(default)]
    pub(crate) questions: FieldMap,
    #[serde(default)]
    pub(crate) disclosures: FieldMap,
    #[serde(default)]
    pub(crate) self_identify: FieldMap,
}

/// Prints sections and notices to stdout.
#[derive(Default)]
pub(crate) struct ConsolePresenter {
    pub(crate) transcript: Vec<String>,
}

impl ConsolePresenter {
    fn emit(&mut self, line: String) {
        println!("{line}");
        self.transcript.push(line);
    }
}

impl WizardPresenter for ConsolePresenter {
    fn show_section(&mut self, section: Section, session: &WizardSession) {
        match (section, session.current_step()) {
            (Section::Success, _) => self.emit("\n== Application submitted ==".to_string()),
            (_, Some(step)) => self.emit(format!(
                "\n== Step {} of 7: {} ==",
                step.number(),
                step.label()
            )),
            (_, None) => {}
        }
        if section == Section::Review {
            if let Some(review) = session.review() {
                self.emit(review.to_string());
            }
        }
    }

    fn notify(&mut self, notice: Notice) {
        let marker = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        };
        self.emit(format!("[{marker}] {}", notice.message));
    }
}

pub(crate) async fn run_walkthrough(args: WalkthroughArgs) -> Result<(), AppError> {
    // The blocking HTTP client must not run on the async runtime's worker threads.
    tokio::task::spawn_blocking(move || {
        let answers = load_answers(&args.answers)?;
        let resume = load_resume(&args.resume)?;
        let transport = HttpSubmissionTransport::new(args.endpoint)
            .map_err(SubmissionError::from)?;
        let (id, _) = drive_wizard(
            answers,
            resume,
            &SubmissionClient::new(transport),
            ConsolePresenter::default(),
        )?;
        println!("Application ID: {id}");
        Ok(())
    })
    .await
    .map_err(|err| AppError::Io(io::Error::other(err)))?
}

pub(crate) fn load_answers(path: &Path) -> Result<WalkthroughAnswers, AppError> {
    let raw = fs::read(path)?;
    serde_json::from_slice(&raw)
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub(crate) fn load_resume(path: &Path) -> Result<ResumeUpload, AppError> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(ResumeUpload::new(file_name, None, bytes))
}

/// Walk every step with `answers` and submit through `client`.
pub(crate) fn drive_wizard<T, P>(
    answers: WalkthroughAnswers,
    resume: ResumeUpload,
    client: &SubmissionClient<T>,
    presenter: P,
) -> Result<(ApplicationId, P), AppError>
where
    T: SubmissionTransport,
    P: WizardPresenter,
{
    let mut controller = WizardController::new(presenter);

    match answers.account {
        AccountAnswers::SignUp {
            email,
            password,
            confirm_password,
            agree_terms,
        } => {
            controller.show_sign_in(false);
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            controller.sign_up(SignUpForm {
                email,
                password,
                confirm_password,
                agree_terms,
            })?;
        }
        AccountAnswers::SignIn { email, password } => {
            controller.show_sign_in(true);
            controller.sign_in(SignInForm { email, password })?;
        }
    }

    controller.submit_step(WizardStep::PersonalInfo, answers.personal_info)?;

    for (index, entry) in answers.experience.into_iter().enumerate() {
        let id = if index == 0 {
            FIRST_ENTRY_ID
        } else {
            controller.add_experience()
        };
        controller.set_currently_employed(id, entry.currently_employed);
        controller.edit_experience(
            id,
            ExperiencePatch {
                job_title: Some(entry.job_title),
                company: Some(entry.company),
                location: Some(entry.location),
                from_date: Some(entry.from_date),
                to_date: (!entry.currently_employed).then_some(entry.to_date),
                description: Some(entry.description),
            },
        )?;
    }
    controller.attach_resume(resume)?;
    controller.submit_step(WizardStep::Experience, FieldMap::new())?;

    controller.submit_step(WizardStep::Questions, answers.questions)?;
    controller.submit_step(WizardStep::Disclosures, answers.disclosures)?;
    controller.submit_step(WizardStep::SelfIdentify, answers.self_identify)?;

    let id = controller.submit_application(client)?;
    let (_, presenter) = controller.into_parts();
    Ok((id, presenter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_intake_service;
    use crate::routes::with_application_routes;
    use job_intake::config::StorageConfig;
    use serde_json::json;

    fn answers() -> WalkthroughAnswers {
        serde_json::from_value(json!({
            "account": {
                "mode": "sign_up",
                "email": "a@b.com",
                "password": "Passw0rd!",
                "agreeTerms": true
            },
            "personalInfo": {
                "firstName": "Ada", "lastName": "Lovelace", "phone": "555-0100",
                "unitNumber": "4B", "streetAddress": "12 Analytical Way", "city": "London",
                "country": "UK", "pinCode": "N1 9GU"
            },
            "experience": [
                { "jobTitle": "Engineer", "company": "Acme", "currentlyEmployed": true, "fromDate": "2020-01" },
                { "jobTitle": "Intern", "company": "Babbage & Co", "fromDate": "2018-06", "toDate": "2019-12" }
            ],
            "questions": {
                "basicRequirements": "yes", "workAuthorized": "yes", "sponsorshipRequired": "no",
                "optTraining": "no", "yearsExperience": "5", "previousKLA": "no",
                "backgroundCheck": "yes", "passion": "Engines", "difficultPeople": "Listen",
                "timeManagement": "Lists", "resilienceType": "steady"
            },
            "disclosures": { "veteranStatus": "not-veteran", "race": "prefer-not", "consentTerms": true },
            "selfIdentify": {
                "language": "English", "disabilityName": "Ada Lovelace",
                "disabilityDate": "2025-01-15", "disabilityStatus": "no"
            }
        }))
        .expect("answers parse")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn walkthrough_submits_to_a_running_service() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig {
            data_file: dir.path().join("applications.json"),
            upload_dir: dir.path().join("uploads"),
        };
        let service = build_intake_service(&storage).expect("service");
        let app = with_application_routes(service.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let endpoint = format!("http://{addr}/api/submit-application");
        let (id, presenter) = tokio::task::spawn_blocking(move || {
            let transport = HttpSubmissionTransport::new(endpoint).expect("client");
            drive_wizard(
                answers(),
                ResumeUpload::new("resume.pdf", None, vec![b'%'; 2048]),
                &SubmissionClient::new(transport),
                ConsolePresenter::default(),
            )
        })
        .await
        .expect("join")
        .expect("walkthrough succeeds");

        assert!(id.is_well_formed());
        let stored = service.get(&id).expect("stored");
        assert_eq!(
            stored.resume.as_ref().map(|doc| doc.size),
            Some(2048)
        );
        assert!(stored.fields.contains_key("jobTitle2"));
        assert!(presenter
            .transcript
            .iter()
            .any(|line| line.contains("Resume: resume.pdf (2.0 KB)")));
        assert_eq!(
            presenter.transcript.last().map(String::as_str),
            Some("\n== Application submitted ==")
        );
        assert!(storage.data_file.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_endpoint_surfaces_network_error() {
        let result = tokio::task::spawn_blocking(|| {
            let transport =
                HttpSubmissionTransport::new("http://127.0.0.1:9/api/submit-application")
                    .expect("client");
            drive_wizard(
                answers(),
                ResumeUpload::new("resume.pdf", None, vec![b'%'; 16]),
                &SubmissionClient::new(transport),
                ConsolePresenter::default(),
            )
        })
        .await
        .expect("join");

        assert!(matches!(
            result,
            Err(AppError::Submission(SubmissionError::Transport(_)))
        ));
    }
}

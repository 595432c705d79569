use super::domain::{ResumeUpload, Section, WizardStep};
use super::experience::ExperiencePatch;
use super::machine::{SignInForm, SignUpForm, StepAdvance, WizardError, WizardSession};
use super::submission::{SubmissionClient, SubmissionError, SubmissionTransport};
use crate::workflows::applications::domain::ApplicationId;
use crate::workflows::form::FieldMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// Transient message shown next to the active section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Rendering surface for the wizard. The session never draws anything itself.
pub trait WizardPresenter {
    fn show_section(&mut self, section: Section, session: &WizardSession);

    fn notify(&mut self, notice: Notice);
}

/// Drives a [`WizardSession`] and reports every outcome to a presenter.
pub struct WizardController<P> {
    session: WizardSession,
    presenter: P,
}

impl<P> WizardController<P>
where
    P: WizardPresenter,
{
    pub fn new(presenter: P) -> Self {
        let mut controller = Self {
            session: WizardSession::new(),
            presenter,
        };
        controller.render();
        controller
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_parts(self) -> (WizardSession, P) {
        (self.session, self.presenter)
    }

    /// Swap between the sign-in and create-account forms of step 1.
    pub fn show_sign_in(&mut self, sign_in: bool) {
        if self.session.current_step() != Some(WizardStep::Account) {
            return;
        }
        let section = if sign_in {
            Section::SignIn
        } else {
            Section::CreateAccount
        };
        self.presenter.show_section(section, &self.session);
    }

    pub fn sign_up(&mut self, form: SignUpForm) -> Result<StepAdvance, WizardError> {
        let outcome = self.session.sign_up(form);
        self.report(outcome)
    }

    pub fn sign_in(&mut self, form: SignInForm) -> Result<StepAdvance, WizardError> {
        let outcome = self.session.sign_in(form);
        self.report(outcome)
    }

    pub fn submit_step(
        &mut self,
        step: WizardStep,
        inputs: FieldMap,
    ) -> Result<StepAdvance, WizardError> {
        let outcome = self.session.submit_step(step, inputs);
        self.report(outcome)
    }

    pub fn go_to_step(&mut self, number: u8) -> Result<Section, WizardError> {
        match self.session.go_to_step(number) {
            Ok(section) => {
                self.presenter.show_section(section, &self.session);
                Ok(section)
            }
            Err(err) => {
                self.presenter.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn attach_resume(&mut self, upload: ResumeUpload) -> Result<(), WizardError> {
        let name = upload.file_name.clone();
        match self.session.attach_resume(upload) {
            Ok(()) => {
                self.presenter
                    .notify(Notice::info(format!("Selected resume: {name}")));
                Ok(())
            }
            Err(err) => {
                self.presenter.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn add_experience(&mut self) -> u32 {
        let id = self.session.add_experience();
        self.render();
        id
    }

    pub fn remove_experience(&mut self, id: u32) -> Result<(), WizardError> {
        match self.session.remove_experience(id) {
            Ok(()) => {
                self.render();
                Ok(())
            }
            Err(err) => {
                self.presenter.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn edit_experience(&mut self, id: u32, patch: ExperiencePatch) -> Result<bool, WizardError> {
        self.session.edit_experience(id, patch).inspect_err(|err| {
            self.presenter.notify(Notice::error(err.to_string()));
        })
    }

    pub fn set_currently_employed(&mut self, id: u32, current: bool) -> bool {
        self.session.set_currently_employed(id, current)
    }

    /// Send the reviewed application. On failure the wizard stays on the review step.
    pub fn submit_application<T>(
        &mut self,
        client: &SubmissionClient<T>,
    ) -> Result<ApplicationId, SubmissionError>
    where
        T: SubmissionTransport,
    {
        match client.submit(&mut self.session) {
            Ok(id) => {
                self.presenter.notify(Notice::success(format!(
                    "Application submitted successfully! Your application ID is {id}"
                )));
                self.render();
                Ok(id)
            }
            Err(err) => {
                self.presenter.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    fn report(
        &mut self,
        outcome: Result<StepAdvance, WizardError>,
    ) -> Result<StepAdvance, WizardError> {
        match &outcome {
            Ok(advance) => {
                self.presenter.notify(Notice::success(advance.message.clone()));
                self.presenter.show_section(advance.section, &self.session);
            }
            Err(err) => self.presenter.notify(Notice::error(err.to_string())),
        }
        outcome
    }

    fn render(&mut self) {
        let section = self.session.phase().section();
        self.presenter.show_section(section, &self.session);
    }
}

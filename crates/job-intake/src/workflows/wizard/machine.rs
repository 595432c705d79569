use chrono::Utc;
use tracing::debug;

use super::domain::{ApplicationDraft, ResumeUpload, Section, WizardPhase, WizardStep};
use super::experience::{entry_field_names, ExperienceList, ExperiencePatch};
use super::review::{self, ReviewSummary};
use crate::workflows::applications::domain::{AccountIdentity, AccountOrigin, ApplicationId};
use crate::workflows::form::{FieldMap, FieldValue};
use crate::workflows::validation::{
    validate_file, validate_password, validate_required_fields, DocumentSlot, ValidationError,
};

/// Errors raised by wizard transitions. The session is left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("step {} is not the active step", .requested.number())]
    StepMismatch {
        requested: WizardStep,
        current: WizardStep,
    },
    #[error("step {requested} does not exist")]
    UnknownStep { requested: u8 },
    #[error("cannot skip ahead to step {requested}; complete the current step first")]
    ForwardJump { requested: u8 },
    #[error("step {} is completed through its own action, not a form submission", .step.number())]
    NotAFormStep { step: WizardStep },
    #[error("the application has already been submitted")]
    AlreadySubmitted,
}

/// Inputs of the account creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_terms: bool,
}

/// Inputs of the sign-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Result of a successful forward transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAdvance {
    pub from: WizardStep,
    pub to: WizardStep,
    pub section: Section,
    pub message: String,
}

/// Session-scoped wizard context: the active step, the draft, and the pieces of UI state
/// (experience blocks, picked resume) that feed the draft.
#[derive(Debug, Clone)]
pub struct WizardSession {
    phase: WizardPhase,
    draft: ApplicationDraft,
    experience: ExperienceList,
    resume: Option<ResumeUpload>,
    review: Option<ReviewSummary>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            phase: WizardPhase::InProgress(WizardStep::Account),
            draft: ApplicationDraft::default(),
            experience: ExperienceList::new(),
            resume: None,
            review: None,
        }
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.phase.step()
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn experience(&self) -> &ExperienceList {
        &self.experience
    }

    pub fn resume(&self) -> Option<&ResumeUpload> {
        self.resume.as_ref()
    }

    /// Summary rendered on entry to the review step.
    pub fn review(&self) -> Option<&ReviewSummary> {
        self.review.as_ref()
    }

    pub fn add_experience(&mut self) -> u32 {
        self.experience.add_entry()
    }

    pub fn remove_experience(&mut self, id: u32) -> Result<(), WizardError> {
        Ok(self.experience.remove_entry(id)?)
    }

    pub fn set_currently_employed(&mut self, id: u32, current: bool) -> bool {
        self.experience.set_currently_employed(id, current)
    }

    pub fn edit_experience(&mut self, id: u32, patch: ExperiencePatch) -> Result<bool, WizardError> {
        Ok(self.experience.update(id, patch)?)
    }

    /// Pick (or replace) the resume document on the experience step, where it is checked on
    /// submission. Later steps cannot swap it out behind that check.
    pub fn attach_resume(&mut self, upload: ResumeUpload) -> Result<(), WizardError> {
        self.require_step(WizardStep::Experience)?;
        self.resume = Some(upload);
        Ok(())
    }

    pub fn sign_up(&mut self, form: SignUpForm) -> Result<StepAdvance, WizardError> {
        self.require_step(WizardStep::Account)?;

        validate_password(&form.password)?;
        if form.password != form.confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if !form.agree_terms {
            return Err(ValidationError::TermsNotAccepted.into());
        }
        require_credentials(&form.email, &form.password, "signupEmail", "signupPassword")?;

        self.establish_account(form.email, form.password, AccountOrigin::SignUp);
        Ok(self.advance(WizardStep::Account, "Account created successfully!"))
    }

    pub fn sign_in(&mut self, form: SignInForm) -> Result<StepAdvance, WizardError> {
        self.require_step(WizardStep::Account)?;
        require_credentials(&form.email, &form.password, "email", "password")?;

        self.establish_account(form.email, form.password, AccountOrigin::SignIn);
        Ok(self.advance(WizardStep::Account, "Login successful!"))
    }

    /// Validate and commit the form of `step`, then move to the following step.
    ///
    /// Nothing is written to the draft unless every check passes.
    pub fn submit_step(
        &mut self,
        step: WizardStep,
        inputs: FieldMap,
    ) -> Result<StepAdvance, WizardError> {
        self.require_step(step)?;
        if matches!(step, WizardStep::Account | WizardStep::Review) {
            return Err(WizardError::NotAFormStep { step });
        }

        let mut candidate = self.draft.fields.clone();
        let mut experience_ids = None;
        let mut resume_reference = None;

        if step == WizardStep::Experience {
            let reference = self.resume.as_ref().map(ResumeUpload::reference);
            validate_file(reference.as_ref(), DocumentSlot::Resume)
                .map_err(ValidationError::from)?;

            let current_ids = self.experience.ids();
            for removed in self
                .draft
                .created_experience_ids
                .iter()
                .filter(|id| !current_ids.contains(id))
            {
                for name in entry_field_names(*removed) {
                    candidate.remove(&name);
                }
            }
            candidate.extend(self.experience.to_fields());
            experience_ids = Some(current_ids);
            resume_reference = reference;
        }

        candidate.extend(inputs);
        if experience_ids.is_some() {
            self.reject_locked_end_dates(&candidate)?;
        }
        if let Some(reference) = resume_reference {
            candidate.insert("resume".to_string(), FieldValue::File(reference));
        }
        validate_required_fields(&candidate, step.required_fields())?;

        self.draft.fields = candidate;
        if let Some(ids) = experience_ids {
            self.draft.created_experience_ids = ids;
        }

        let message = format!("{} saved successfully!", step.label());
        Ok(self.advance(step, &message))
    }

    /// Return to an earlier (or the current) step without re-validating or discarding data.
    pub fn go_to_step(&mut self, number: u8) -> Result<Section, WizardError> {
        let current = self.require_in_progress()?;
        let target =
            WizardStep::from_number(number).ok_or(WizardError::UnknownStep { requested: number })?;
        if target > current {
            return Err(WizardError::ForwardJump { requested: number });
        }

        if target != WizardStep::Review {
            self.review = None;
        }
        self.phase = WizardPhase::InProgress(target);
        debug!(step = target.number(), "wizard moved back");
        Ok(target.section())
    }

    /// Enter the terminal state once the server has confirmed the submission.
    ///
    /// Hands back the draft, which the session no longer holds.
    pub(crate) fn complete(
        &mut self,
        application_id: ApplicationId,
    ) -> Result<ApplicationDraft, WizardError> {
        self.require_step(WizardStep::Review)?;
        self.phase = WizardPhase::Submitted { application_id };
        self.resume = None;
        self.review = None;
        self.experience = ExperienceList::new();
        Ok(std::mem::take(&mut self.draft))
    }

    fn establish_account(&mut self, email: String, password: String, origin: AccountOrigin) {
        self.draft.account = Some(AccountIdentity {
            email: email.trim().to_string(),
            password,
            created_at: Some(Utc::now()),
            origin: Some(origin),
        });
    }

    fn advance(&mut self, from: WizardStep, message: &str) -> StepAdvance {
        let to = from.next().unwrap_or(WizardStep::Review);
        if to == WizardStep::Review {
            self.review = Some(review::render(&self.draft));
        }
        self.phase = WizardPhase::InProgress(to);
        debug!(from = from.number(), to = to.number(), "wizard advanced");

        StepAdvance {
            from,
            to,
            section: to.section(),
            message: message.to_string(),
        }
    }

    /// A currently-held role has no end date, whatever the submitted inputs say.
    fn reject_locked_end_dates(&self, candidate: &FieldMap) -> Result<(), ValidationError> {
        for entry in self.experience.entries() {
            if !entry.end_date_locked() {
                continue;
            }
            let end_date = candidate.get(&format!("toDate{}", entry.id));
            if end_date.is_some_and(|value| !value.is_blank()) {
                return Err(ValidationError::EndDateLocked { id: entry.id });
            }
        }
        Ok(())
    }

    fn require_in_progress(&self) -> Result<WizardStep, WizardError> {
        self.phase.step().ok_or(WizardError::AlreadySubmitted)
    }

    fn require_step(&self, requested: WizardStep) -> Result<(), WizardError> {
        let current = self.require_in_progress()?;
        if current == requested {
            Ok(())
        } else {
            Err(WizardError::StepMismatch { requested, current })
        }
    }
}

fn require_credentials(
    email: &str,
    password: &str,
    email_field: &str,
    password_field: &str,
) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if email.trim().is_empty() {
        missing.push(email_field.to_string());
    }
    if password.is_empty() {
        missing.push(password_field.to_string());
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { missing })
    }
}

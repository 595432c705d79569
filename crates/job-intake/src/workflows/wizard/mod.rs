//! Client-side application wizard: seven linear steps, a draft that accumulates each committed
//! step, and a single multipart submission at the end.

pub mod domain;
pub mod experience;
pub mod machine;
pub mod presenter;
pub mod review;
pub mod submission;

#[cfg(test)]
mod tests;

pub use domain::{ApplicationDraft, ResumeUpload, Section, WizardPhase, WizardStep};
pub use experience::{ExperienceEntry, ExperienceList, ExperiencePatch, FIRST_ENTRY_ID};
pub use machine::{SignInForm, SignUpForm, StepAdvance, WizardError, WizardSession};
pub use presenter::{Notice, NoticeLevel, WizardController, WizardPresenter};
pub use review::{render as render_review, ReviewItem, ReviewSection, ReviewSummary};
pub use submission::{
    build_request, HttpSubmissionTransport, SubmissionClient, SubmissionError, SubmissionRequest,
    SubmissionTransport, TransportError, TransportResponse,
};

use serde::{Deserialize, Serialize};

use crate::workflows::applications::domain::{AccountIdentity, ApplicationId};
use crate::workflows::form::{FieldMap, FileReference};

/// The seven linear stages of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Account,
    PersonalInfo,
    Experience,
    Questions,
    Disclosures,
    SelfIdentify,
    Review,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Account,
            Self::PersonalInfo,
            Self::Experience,
            Self::Questions,
            Self::Disclosures,
            Self::SelfIdentify,
            Self::Review,
        ]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Account => 1,
            Self::PersonalInfo => 2,
            Self::Experience => 3,
            Self::Questions => 4,
            Self::Disclosures => 5,
            Self::SelfIdentify => 6,
            Self::Review => 7,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|step| step.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Account => "Create Account/Sign In",
            Self::PersonalInfo => "My Information",
            Self::Experience => "My Experience",
            Self::Questions => "Application Questions",
            Self::Disclosures => "Voluntary Disclosures",
            Self::SelfIdentify => "Self Identify",
            Self::Review => "Review",
        }
    }

    /// Fields that must be present and non-blank before leaving this step.
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Account | Self::Review => &[],
            Self::PersonalInfo => &[
                "firstName",
                "lastName",
                "phone",
                "unitNumber",
                "streetAddress",
                "city",
                "country",
                "pinCode",
            ],
            Self::Experience => &["jobTitle1", "company1"],
            Self::Questions => &[
                "basicRequirements",
                "workAuthorized",
                "sponsorshipRequired",
                "optTraining",
                "yearsExperience",
                "previousKLA",
                "backgroundCheck",
                "passion",
                "difficultPeople",
                "timeManagement",
                "resilienceType",
            ],
            Self::Disclosures => &["veteranStatus", "race", "consentTerms"],
            Self::SelfIdentify => &[
                "language",
                "disabilityName",
                "disabilityDate",
                "disabilityStatus",
            ],
        }
    }

    pub const fn section(self) -> Section {
        match self {
            Self::Account => Section::CreateAccount,
            Self::PersonalInfo => Section::Information,
            Self::Experience => Section::Experience,
            Self::Questions => Section::Questions,
            Self::Disclosures => Section::Disclosures,
            Self::SelfIdentify => Section::SelfIdentify,
            Self::Review => Section::Review,
        }
    }
}

/// Screens the presenter can show. Sign-in shares step 1 with account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CreateAccount,
    SignIn,
    Information,
    Experience,
    Questions,
    Disclosures,
    SelfIdentify,
    Review,
    Success,
}

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    InProgress(WizardStep),
    Submitted { application_id: ApplicationId },
}

impl WizardPhase {
    pub fn step(&self) -> Option<WizardStep> {
        match self {
            WizardPhase::InProgress(step) => Some(*step),
            WizardPhase::Submitted { .. } => None,
        }
    }

    pub fn section(&self) -> Section {
        match self {
            WizardPhase::InProgress(step) => step.section(),
            WizardPhase::Submitted { .. } => Section::Success,
        }
    }
}

/// Everything the applicant has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub account: Option<AccountIdentity>,
    pub fields: FieldMap,
    pub created_experience_ids: Vec<u32>,
}

/// A document picked in the browser, bytes included, waiting for the final submission.
#[derive(Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    pub fn reference(&self) -> FileReference {
        FileReference {
            name: self.file_name.clone(),
            size: self.bytes.len() as u64,
            content_type: self.content_type.clone(),
        }
    }
}

impl std::fmt::Debug for ResumeUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_numbered_linearly() {
        for (index, step) in WizardStep::ordered().into_iter().enumerate() {
            assert_eq!(step.number() as usize, index + 1);
            assert_eq!(WizardStep::from_number(step.number()), Some(step));
        }
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Account.next(), Some(WizardStep::PersonalInfo));
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(8), None);
    }

    #[test]
    fn every_step_routes_to_its_own_section() {
        let sections: Vec<Section> = WizardStep::ordered()
            .into_iter()
            .map(WizardStep::section)
            .collect();
        for (i, a) in sections.iter().enumerate() {
            for b in &sections[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

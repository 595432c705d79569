use super::common::*;
use crate::workflows::form::FieldMap;
use crate::workflows::wizard::{
    NoticeLevel, Section, SignUpForm, SubmissionClient, WizardController, WizardStep,
};

#[test]
fn controller_shows_initial_section_and_reports_outcomes() {
    let mut controller = WizardController::new(RecordingPresenter::default());
    assert_eq!(controller.presenter().sections, vec![Section::CreateAccount]);

    controller.show_sign_in(true);
    let weak = SignUpForm {
        password: "weak".to_string(),
        confirm_password: "weak".to_string(),
        ..sign_up_form()
    };
    assert!(controller.sign_up(weak).is_err());
    controller.sign_up(sign_up_form()).expect("sign up");

    let presenter = controller.presenter();
    assert_eq!(
        presenter.sections,
        vec![Section::CreateAccount, Section::SignIn, Section::Information]
    );
    let levels: Vec<NoticeLevel> = presenter.notices.iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
    assert!(presenter.notices[0].message.contains("at least 8 characters"));
}

#[test]
fn sign_in_toggle_is_ignored_after_step_one() {
    let mut controller = WizardController::new(RecordingPresenter::default());
    controller.sign_up(sign_up_form()).expect("sign up");
    let shown = controller.presenter().sections.len();

    controller.show_sign_in(true);
    assert_eq!(controller.presenter().sections.len(), shown);
}

#[test]
fn controller_submits_and_renders_success() {
    let mut controller = WizardController::new(RecordingPresenter::default());
    controller.sign_up(sign_up_form()).expect("sign up");
    controller
        .submit_step(WizardStep::PersonalInfo, personal_info())
        .expect("personal info");
    controller
        .edit_experience(
            1,
            crate::workflows::wizard::ExperiencePatch {
                job_title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .expect("edit");
    controller
        .attach_resume(pdf_upload(512))
        .expect("resume attaches");
    controller
        .submit_step(WizardStep::Experience, FieldMap::new())
        .expect("experience");
    controller
        .submit_step(WizardStep::Questions, questions())
        .expect("questions");
    controller
        .submit_step(WizardStep::Disclosures, disclosures())
        .expect("disclosures");
    controller
        .submit_step(WizardStep::SelfIdentify, self_identify())
        .expect("self identify");

    let client = SubmissionClient::new(ScriptedTransport::accepting("APP-K2J9"));
    let id = controller.submit_application(&client).expect("submitted");

    let (session, presenter) = controller.into_parts();
    assert_eq!(id.as_str(), "APP-K2J9");
    assert_eq!(session.phase().section(), Section::Success);
    assert_eq!(presenter.sections.last(), Some(&Section::Success));
    let last = presenter.notices.last().expect("notice");
    assert_eq!(last.level, NoticeLevel::Success);
    assert!(last.message.contains("APP-K2J9"));
}

#[test]
fn failed_navigation_is_reported() {
    let mut controller = WizardController::new(RecordingPresenter::default());
    assert!(controller.go_to_step(5).is_err());
    assert_eq!(
        controller.presenter().notices.last().map(|n| n.level),
        Some(NoticeLevel::Error)
    );
}

#[test]
fn resume_picked_outside_experience_step_is_reported() {
    let mut controller = WizardController::new(RecordingPresenter::default());

    assert!(controller.attach_resume(pdf_upload(256)).is_err());

    let notices = &controller.presenter().notices;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("step 3"));
    assert!(controller.session().resume().is_none());
}

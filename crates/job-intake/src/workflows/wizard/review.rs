use std::fmt;

use serde::Serialize;

use super::domain::ApplicationDraft;
use super::experience::FIRST_ENTRY_ID;
use crate::workflows::form::{display_or, joined_address, FieldMap, FieldValue};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub title: String,
    pub items: Vec<ReviewItem>,
}

impl ReviewSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn item(mut self, label: &'static str, value: String) -> Self {
        self.items.push(ReviewItem { label, value });
        self
    }
}

/// Read-only projection of a draft shown on the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub sections: Vec<ReviewSection>,
}

impl ReviewSummary {
    pub fn value(&self, section: &str, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|candidate| candidate.title == section)?
            .items
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.value.as_str())
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", section.title)?;
            for item in &section.items {
                writeln!(f, "- {}: {}", item.label, item.value)?;
            }
        }
        Ok(())
    }
}

/// Project `draft` into review sections. Pure: the same draft always renders the same summary.
pub fn render(draft: &ApplicationDraft) -> ReviewSummary {
    let fields = &draft.fields;
    let na = |name: &str| display_or(fields, name, NOT_AVAILABLE);
    let unspecified = |name: &str| display_or(fields, name, NOT_SPECIFIED);

    let email = draft
        .account
        .as_ref()
        .map(|account| account.email.trim())
        .filter(|email| !email.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let address = joined_address(fields);
    let location = if address.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        address
    };

    let mut sections = vec![
        ReviewSection::new("Personal Information")
            .item("Name", format!("{} {}", na("firstName"), na("lastName")))
            .item("Email", email)
            .item("Phone", na("phone"))
            .item("Location", location),
        ReviewSection::new("Work Experience")
            .item("Current Role", na("jobTitle1"))
            .item("Company", na("company1"))
            .item("Years of Experience", na("yearsExperience"))
            .item("Resume", resume_line(fields)),
    ];

    for id in draft
        .created_experience_ids
        .iter()
        .copied()
        .filter(|id| *id != FIRST_ENTRY_ID)
    {
        sections.push(
            ReviewSection::new(format!("Work Experience {id}"))
                .item("Job Title", na(&format!("jobTitle{id}")))
                .item("Company", na(&format!("company{id}")))
                .item("Dates", date_range(fields, id)),
        );
    }

    sections.push(
        ReviewSection::new("Work Authorization")
            .item("Authorized to work in US", yes_no(fields, "workAuthorized"))
            .item("Requires sponsorship", yes_no(fields, "sponsorshipRequired")),
    );
    sections.push(
        ReviewSection::new("Voluntary Disclosures")
            .item("Veteran Status", unspecified("veteranStatus"))
            .item("Gender", unspecified("gender"))
            .item("Race", unspecified("race")),
    );

    ReviewSummary { sections }
}

fn yes_no(fields: &FieldMap, name: &str) -> String {
    match fields.get(name).and_then(FieldValue::as_display) {
        None => NOT_AVAILABLE.to_string(),
        Some(answer) if answer.eq_ignore_ascii_case("yes") => "Yes".to_string(),
        Some(_) => "No".to_string(),
    }
}

fn resume_line(fields: &FieldMap) -> String {
    match fields.get("resume") {
        Some(FieldValue::File(file)) if !file.name.trim().is_empty() => {
            format!("{} ({:.1} KB)", file.name, file.size as f64 / 1024.0)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn date_range(fields: &FieldMap, id: u32) -> String {
    let from = display_or(fields, &format!("fromDate{id}"), NOT_AVAILABLE);
    let current = fields
        .get(&format!("currentWork{id}"))
        .is_some_and(|value| !value.is_blank());
    let to = if current {
        "Present".to_string()
    } else {
        display_or(fields, &format!("toDate{id}"), NOT_AVAILABLE)
    };
    format!("{from} - {to}")
}

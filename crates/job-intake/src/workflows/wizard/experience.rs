use serde::{Deserialize, Serialize};

use crate::workflows::form::{FieldMap, FieldValue};
use crate::workflows::validation::ValidationError;

/// Id of the entry every session starts with; it can never be removed.
pub const FIRST_ENTRY_ID: u32 = 1;

/// Form-field prefixes for one experience entry; the entry id is appended (`jobTitle2`).
pub const ENTRY_FIELD_PREFIXES: [&str; 7] = [
    "jobTitle",
    "company",
    "location",
    "currentWork",
    "fromDate",
    "toDate",
    "roleDescription",
];

/// One repeatable work-experience block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: u32,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub currently_employed: bool,
    pub from_date: String,
    pub to_date: String,
    pub description: String,
}

impl ExperienceEntry {
    fn blank(id: u32) -> Self {
        Self {
            id,
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            currently_employed: false,
            from_date: String::new(),
            to_date: String::new(),
            description: String::new(),
        }
    }

    /// The end-date input is disabled while the applicant still works here.
    pub fn end_date_locked(&self) -> bool {
        self.currently_employed
    }

    fn write_fields(&self, fields: &mut FieldMap) {
        let id = self.id;
        fields.insert(format!("jobTitle{id}"), FieldValue::text(&self.job_title));
        fields.insert(format!("company{id}"), FieldValue::text(&self.company));
        fields.insert(format!("location{id}"), FieldValue::text(&self.location));
        fields.insert(
            format!("currentWork{id}"),
            FieldValue::Flag(self.currently_employed),
        );
        fields.insert(format!("fromDate{id}"), FieldValue::text(&self.from_date));
        fields.insert(format!("toDate{id}"), FieldValue::text(&self.to_date));
        fields.insert(
            format!("roleDescription{id}"),
            FieldValue::text(&self.description),
        );
    }
}

/// Partial edit applied to an entry; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperiencePatch {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub description: Option<String>,
}

/// Ordered work-experience entries with ids that are never reused within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceList {
    entries: Vec<ExperienceEntry>,
    last_issued: u32,
}

impl Default for ExperienceList {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperienceList {
    pub fn new() -> Self {
        Self {
            entries: vec![ExperienceEntry::blank(FIRST_ENTRY_ID)],
            last_issued: FIRST_ENTRY_ID,
        }
    }

    pub fn entries(&self) -> &[ExperienceEntry] {
        &self.entries
    }

    pub fn get(&self, id: u32) -> Option<&ExperienceEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the first entry is permanent.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_entry(&mut self) -> u32 {
        self.last_issued += 1;
        let id = self.last_issued;
        self.entries.push(ExperienceEntry::blank(id));
        id
    }

    /// Removing an unknown id is a no-op; the first entry cannot be removed.
    pub fn remove_entry(&mut self, id: u32) -> Result<(), ValidationError> {
        if id == FIRST_ENTRY_ID {
            return Err(ValidationError::PermanentExperience);
        }
        self.entries.retain(|entry| entry.id != id);
        Ok(())
    }

    /// Toggle "I currently work here". Checking it clears and locks the end date.
    ///
    /// Returns `false` when no entry has that id.
    pub fn set_currently_employed(&mut self, id: u32, current: bool) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        entry.currently_employed = current;
        if current {
            entry.to_date.clear();
        }
        true
    }

    /// Apply `patch` to entry `id`. Returns `Ok(false)` when the entry does not exist.
    pub fn update(&mut self, id: u32, patch: ExperiencePatch) -> Result<bool, ValidationError> {
        let Some(entry) = self.entry_mut(id) else {
            return Ok(false);
        };

        let sets_end_date = patch
            .to_date
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        if entry.end_date_locked() && sets_end_date {
            return Err(ValidationError::EndDateLocked { id });
        }

        let ExperiencePatch {
            job_title,
            company,
            location,
            from_date,
            to_date,
            description,
        } = patch;

        if let Some(value) = job_title {
            entry.job_title = value;
        }
        if let Some(value) = company {
            entry.company = value;
        }
        if let Some(value) = location {
            entry.location = value;
        }
        if let Some(value) = from_date {
            entry.from_date = value;
        }
        if let Some(value) = to_date {
            entry.to_date = value;
        }
        if let Some(value) = description {
            entry.description = value;
        }
        Ok(true)
    }

    /// Flatten every entry into the form-field names used by the application payload.
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        for entry in &self.entries {
            entry.write_fields(&mut fields);
        }
        fields
    }

    fn entry_mut(&mut self, id: u32) -> Option<&mut ExperienceEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }
}

/// Field names belonging to entry `id`.
pub fn entry_field_names(id: u32) -> impl Iterator<Item = String> {
    ENTRY_FIELD_PREFIXES
        .into_iter()
        .map(move |prefix| format!("{prefix}{id}"))
}

//! Form values shared by the wizard draft and the stored application.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name to value, ordered so drafts serialize deterministically.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Value captured by a single form control.
///
/// Checkboxes arrive as flags, file inputs as references, everything else as text. Numbers are
/// accepted so hand-built payloads (`resumeFileSize: 1024`) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
    File(FileReference),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// An unticked checkbox or an empty input counts as not provided.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Flag(checked) => !checked,
            FieldValue::Number(_) => false,
            FieldValue::File(file) => file.name.trim().is_empty(),
        }
    }

    /// Display form used by the review page and the export.
    pub fn as_display(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(match self {
            FieldValue::Text(value) => value.trim().to_string(),
            FieldValue::Flag(_) => "Yes".to_string(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::File(file) => file.name.clone(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Metadata describing a document picked for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileReference {
    pub fn new(name: impl Into<String>, size: u64, content_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Look up a field and render it, falling back to `placeholder`.
pub fn display_or(fields: &FieldMap, name: &str, placeholder: &str) -> String {
    fields
        .get(name)
        .and_then(FieldValue::as_display)
        .unwrap_or_else(|| placeholder.to_string())
}

/// Address parts as one line, skipping blanks; empty when nothing was entered.
pub fn joined_address(fields: &FieldMap) -> String {
    ADDRESS_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name).and_then(FieldValue::as_display))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Address inputs in display order.
pub const ADDRESS_FIELDS: [&str; 5] = ["unitNumber", "streetAddress", "city", "country", "pinCode"];

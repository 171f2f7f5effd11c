//! Column layout shared by the exporters
//!
//! Optional columns appear only when at least one contact carries the field.

use crate::contact::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Site,
    Kind,
    Value,
    Description,
    EnrichedDescription,
    Page,
    Validated,
    Notes,
}

impl Column {
    /// Human-readable header
    pub fn title(&self) -> &'static str {
        match self {
            Self::Site => "Site",
            Self::Kind => "Type",
            Self::Value => "Value",
            Self::Description => "Description",
            Self::EnrichedDescription => "AI description",
            Self::Page => "Page",
            Self::Validated => "AI validated",
            Self::Notes => "Notes",
        }
    }

    /// Column name for tabular stores
    pub fn key(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Kind => "kind",
            Self::Value => "value",
            Self::Description => "description",
            Self::EnrichedDescription => "enriched_description",
            Self::Page => "page",
            Self::Validated => "validated",
            Self::Notes => "notes",
        }
    }

    /// Cell text for one contact
    pub fn render(&self, contact: &Contact) -> String {
        match self {
            Self::Site => contact.site.clone().unwrap_or_default(),
            Self::Kind => contact.kind.label().to_string(),
            Self::Value => contact.value.clone(),
            Self::Description => contact.description.clone(),
            Self::EnrichedDescription => contact.enriched_description.clone().unwrap_or_default(),
            Self::Page => contact.source_url.clone(),
            Self::Validated => match contact.validated {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => String::new(),
            },
            Self::Notes => contact
                .flags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Columns to write for a set of contacts, in display order
pub fn columns_for(contacts: &[Contact]) -> Vec<Column> {
    let has_site = contacts.iter().any(|c| c.site.is_some());
    let has_enriched = contacts.iter().any(|c| c.enriched_description.is_some());
    let has_validated = contacts.iter().any(|c| c.validated.is_some());
    let has_notes = contacts.iter().any(|c| !c.flags.is_empty());

    let mut columns = Vec::with_capacity(8);
    if has_site {
        columns.push(Column::Site);
    }
    columns.extend([Column::Kind, Column::Value, Column::Description]);
    if has_enriched {
        columns.push(Column::EnrichedDescription);
    }
    columns.push(Column::Page);
    if has_validated {
        columns.push(Column::Validated);
    }
    if has_notes {
        columns.push(Column::Notes);
    }
    columns
}

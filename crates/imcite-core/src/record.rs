//! Record model: one bibliographic entry with two synchronized views.
//!
//! A record holds a structured [`Entry`] and a serialized text form. The two
//! never diverge outside a mutation: field edits regenerate the text in
//! canonical form, and text edits are reparsed and diffed against the live
//! fields so listeners hear about exactly the fields that changed.

use imcite_bibtex::{format_entry, parse_entry, Entry, ParseError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::export::{export_entry, ExportOptions};

/// Stable identity of a record, independent of its citation key
pub type RecordId = Uuid;

/// One field difference observed while applying a text edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDelta {
    pub field: String,
    /// Previous value; empty means the field was unset
    pub old: String,
    /// New value; empty means the field is now unset
    pub new: String,
}

/// Outcome of an applied text edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    pub old_text: String,
    pub new_text: String,
    /// (old, new) when the entry kind changed
    pub kind: Option<(String, String)>,
    /// (old, new) when the citation key changed
    pub key: Option<(String, String)>,
    /// Field differences, old-entry order first, then newly added fields
    pub fields: Vec<FieldDelta>,
}

/// One bibliographic entry plus its serialized text form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    entry: Entry,
    serialized: String,
}

impl Record {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::from_entry(Entry::new(kind, key))
    }

    /// Wrap a parsed entry, rendering its canonical text form.
    pub fn from_entry(entry: Entry) -> Self {
        let serialized = format_entry(&entry);
        Record {
            id: Uuid::new_v4(),
            entry,
            serialized,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.entry.kind
    }

    pub fn key(&self) -> &str {
        &self.entry.key
    }

    /// Field value by name; empty string when unset.
    pub fn get(&self, name: &str) -> &str {
        self.entry.get_field(name).unwrap_or("")
    }

    /// Read-only view of the underlying entry
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Current text form. Canonical after field edits; the user's text
    /// verbatim after a text edit.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    /// Text form with export options applied to the author field.
    pub fn export_serialized(&self, options: &ExportOptions) -> String {
        format_entry(&export_entry(&self.entry, options))
    }

    /// Set a field value. A blank value unsets the field. Returns the
    /// observed difference, or `None` when nothing actually changed.
    pub fn set(&mut self, name: &str, value: &str) -> Option<FieldDelta> {
        let field = name.to_lowercase();
        let old = self.get(&field).to_string();
        let new = if value.trim().is_empty() {
            String::new()
        } else {
            value.to_string()
        };
        if old == new {
            return None;
        }
        self.entry.set_field(&field, value);
        self.serialized = format_entry(&self.entry);
        Some(FieldDelta { field, old, new })
    }

    /// Change the entry kind. Returns (old, new) when it differs.
    pub fn set_kind(&mut self, kind: &str) -> Option<(String, String)> {
        if self.entry.kind == kind {
            return None;
        }
        let old = std::mem::replace(&mut self.entry.kind, kind.to_string());
        self.serialized = format_entry(&self.entry);
        Some((old, kind.to_string()))
    }

    /// Change the citation key. Returns (old, new) when it differs.
    pub fn set_key(&mut self, key: &str) -> Option<(String, String)> {
        if self.entry.key == key {
            return None;
        }
        let old = std::mem::replace(&mut self.entry.key, key.to_string());
        self.serialized = format_entry(&self.entry);
        Some((old, key.to_string()))
    }

    /// Replace this record's text, reparsing it as a single strict entry.
    ///
    /// The new text is kept verbatim as the serialized form. Returns
    /// `Ok(None)` when the text is identical to the current form, and an
    /// error without touching the record when the text does not parse.
    pub fn set_text(&mut self, text: &str) -> Result<Option<TextDelta>, ParseError> {
        if text == self.serialized {
            return Ok(None);
        }
        let parsed = parse_entry(text)?;

        let old_entry = std::mem::replace(&mut self.entry, parsed);
        let old_text = std::mem::replace(&mut self.serialized, text.to_string());

        let kind = (old_entry.kind != self.entry.kind)
            .then(|| (old_entry.kind.clone(), self.entry.kind.clone()));
        let key = (old_entry.key != self.entry.key)
            .then(|| (old_entry.key.clone(), self.entry.key.clone()));

        let mut fields = Vec::new();
        for f in &old_entry.fields {
            let new = self.entry.get_field(&f.name).unwrap_or("");
            if f.value != new {
                fields.push(FieldDelta {
                    field: f.name.clone(),
                    old: f.value.clone(),
                    new: new.to_string(),
                });
            }
        }
        for f in &self.entry.fields {
            if old_entry.get_field(&f.name).is_none() && !f.value.is_empty() {
                fields.push(FieldDelta {
                    field: f.name.clone(),
                    old: String::new(),
                    new: f.value.clone(),
                });
            }
        }

        Ok(Some(TextDelta {
            old_text,
            new_text: text.to_string(),
            kind,
            key,
            fields,
        }))
    }
}

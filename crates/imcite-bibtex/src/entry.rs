//! BibTeX entry model.

use serde::{Deserialize, Serialize};

/// A single field within a BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A parsed BibTeX entry
///
/// Field names are stored lowercase. Field order is preserved from the
/// source text; overwriting a field keeps its original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry kind, e.g. "article" (case preserved from source)
    pub kind: String,
    /// Citation key identifying the entry
    pub key: String,
    /// Fields in source order
    pub fields: Vec<Field>,
}

impl Entry {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Entry {
            kind: kind.into(),
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Get a field value by name (case-insensitive)
    pub fn get_field(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Insert or overwrite a field, keeping the position of an existing one.
    pub fn insert_field(&mut self, name: &str, value: &str) {
        let name = name.to_lowercase();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value.to_string(),
            None => self.fields.push(Field {
                name,
                value: value.to_string(),
            }),
        }
    }

    /// Set a field value. A blank value removes the field.
    pub fn set_field(&mut self, name: &str, value: &str) {
        if value.trim().is_empty() {
            self.remove_field(name);
        } else {
            self.insert_field(name, value);
        }
    }

    /// Remove a field by name (case-insensitive)
    pub fn remove_field(&mut self, name: &str) {
        let name = name.to_lowercase();
        self.fields.retain(|f| f.name != name);
    }

    /// Names of all fields, in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    // Convenience accessors for commonly used fields

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    pub fn editor(&self) -> Option<&str> {
        self.get_field("editor")
    }

    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }

    pub fn doi(&self) -> Option<&str> {
        self.get_field("doi")
    }

    pub fn eprint(&self) -> Option<&str> {
        self.get_field("eprint")
    }
}

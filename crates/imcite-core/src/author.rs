//! Author name parsing and formatting.
//!
//! Names come in two shapes: family-first with a comma (`Knuth, Donald E.`)
//! and given-first without (`Donald E. Knuth`). Lists join individual names
//! with `" and "`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub given: String,
    pub family: String,
}

impl Author {
    /// Parse one name. Text after the last comma is the given name; with no
    /// comma, text after the last space is the family name; a single token
    /// is a bare family name.
    pub fn parse(name: &str) -> Author {
        if let Some(i) = name.rfind(',') {
            Author {
                family: name[..i].trim().to_string(),
                given: name[i + 1..].trim().to_string(),
            }
        } else if let Some(i) = name.rfind(' ') {
            Author {
                given: name[..i].trim().to_string(),
                family: name[i + 1..].trim().to_string(),
            }
        } else {
            Author {
                given: String::new(),
                family: name.trim().to_string(),
            }
        }
    }

    /// `"Given Family"`, or the bare family name when no given name is set.
    pub fn given_family(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{} {}", self.given, self.family)
        }
    }

    /// `"Family, Given"`, or the bare family name when no given name is set.
    pub fn family_given(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{}, {}", self.family, self.given)
        }
    }
}

/// Split an author-list field on `" and "`, dropping empty segments.
pub fn split_authors(list: &str) -> Vec<Author> {
    list.split(" and ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Author::parse)
        .collect()
}

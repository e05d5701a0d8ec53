//! Export rendering with author-list post-processing.

use imcite_bibtex::Entry;
use serde::{Deserialize, Serialize};

use crate::author::{split_authors, Author};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorFormat {
    /// "Donald E. Knuth"
    GivenFamily,
    /// "Knuth, Donald E."
    FamilyGiven,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub author_format: AuthorFormat,
    /// Author-count limit before truncation, unbounded when `None`.
    pub max_authors: Option<usize>,
    /// Text appended in place of the truncated tail, e.g. "and others".
    pub suffix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            author_format: AuthorFormat::GivenFamily,
            max_authors: Some(5),
            suffix: "and others".to_string(),
        }
    }
}

/// Copy an entry with its author field reformatted per the options. Entries
/// without authors pass through unchanged.
pub fn export_entry(entry: &Entry, options: &ExportOptions) -> Entry {
    let mut out = entry.clone();
    let authors = split_authors(entry.author().unwrap_or(""));
    if authors.is_empty() {
        return out;
    }
    out.insert_field("author", &format_author_list(&authors, options));
    out
}

/// Join authors with `" and "`, truncating to the configured limit. The
/// suffix is appended only when truncation actually removed someone.
pub fn format_author_list(authors: &[Author], options: &ExportOptions) -> String {
    let truncated = options
        .max_authors
        .map_or(false, |max| authors.len() > max);
    let shown = match options.max_authors {
        Some(max) if truncated => &authors[..max],
        _ => authors,
    };
    let mut list = shown
        .iter()
        .map(|a| match options.author_format {
            AuthorFormat::GivenFamily => a.given_family(),
            AuthorFormat::FamilyGiven => a.family_given(),
        })
        .collect::<Vec<_>>()
        .join(" and ");
    if truncated {
        let suffix = options.suffix.trim();
        if !suffix.is_empty() {
            if !list.is_empty() {
                list.push(' ');
            }
            list.push_str(suffix);
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(format: AuthorFormat, max: Option<usize>) -> ExportOptions {
        ExportOptions {
            author_format: format,
            max_authors: max,
            suffix: "and others".to_string(),
        }
    }

    fn entry_with_authors(authors: &str) -> Entry {
        let mut entry = Entry::new("article", "k");
        entry.insert_field("title", "T");
        entry.insert_field("author", authors);
        entry
    }

    #[test]
    fn test_truncation_appends_suffix() {
        let authors = split_authors("A and B and C");
        let list = format_author_list(&authors, &options(AuthorFormat::GivenFamily, Some(2)));
        assert_eq!(list, "A and B and others");
    }

    #[test]
    fn test_no_truncation_no_suffix() {
        let authors = split_authors("A and B and C");
        let list = format_author_list(&authors, &options(AuthorFormat::GivenFamily, Some(3)));
        assert_eq!(list, "A and B and C");
    }

    #[test]
    fn test_unbounded_when_unset() {
        let authors = split_authors("A and B and C and D and E and F");
        let list = format_author_list(&authors, &options(AuthorFormat::GivenFamily, None));
        assert_eq!(list, "A and B and C and D and E and F");
    }

    #[test]
    fn test_family_given_reordering() {
        let authors = split_authors("Jane Smith and John Doe");
        let list = format_author_list(&authors, &options(AuthorFormat::FamilyGiven, None));
        assert_eq!(list, "Smith, Jane and Doe, John");
    }

    #[test]
    fn test_given_family_normalizes_comma_form() {
        let authors = split_authors("Knuth, Donald E.");
        let list = format_author_list(&authors, &options(AuthorFormat::GivenFamily, None));
        assert_eq!(list, "Donald E. Knuth");
    }

    #[test]
    fn test_suffix_is_trimmed_before_joining() {
        let authors = split_authors("A and B and C");
        let opts = ExportOptions {
            author_format: AuthorFormat::GivenFamily,
            max_authors: Some(1),
            suffix: "  et al.  ".to_string(),
        };
        assert_eq!(format_author_list(&authors, &opts), "A et al.");
    }

    #[test]
    fn test_export_entry_rewrites_author_in_place() {
        let entry = entry_with_authors("Smith, Jane and Doe, John");
        let out = export_entry(&entry, &ExportOptions::default());
        assert_eq!(out.author(), Some("Jane Smith and John Doe"));
        // Field order and the rest of the entry are untouched.
        assert_eq!(out.fields[0].name, "title");
        assert_eq!(out.fields[1].name, "author");
        assert_eq!(out.key, "k");
    }

    #[test]
    fn test_export_entry_without_authors_unchanged() {
        let mut entry = Entry::new("misc", "k");
        entry.insert_field("title", "T");
        let out = export_entry(&entry, &ExportOptions::default());
        assert_eq!(out, entry);
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.author_format, AuthorFormat::GivenFamily);
        assert_eq!(options.max_authors, Some(5));
        assert_eq!(options.suffix, "and others");
    }
}

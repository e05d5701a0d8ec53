//! Canonical text rendering for entries.

use crate::entry::Entry;

/// Render an entry in canonical form: `@kind{key,` followed by one
/// `name = {value},` line per field, names padded to the longest field
/// name so the `=` signs align, then a closing `}`.
pub fn format_entry(entry: &Entry) -> String {
    let width = entry
        .fields
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0);
    let mut out = format!("@{}{{{},\n", entry.kind, entry.key);
    for field in &entry.fields {
        out.push_str(&format!(
            "    {:<width$} = {{{}}},\n",
            field.name, field.value
        ));
    }
    out.push('}');
    out
}

/// Render a whole document: entries joined by single newlines with a
/// trailing newline. No entries renders as the empty string.
pub fn format_document(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = entries.iter().map(format_entry).collect();
    format!("{}\n", rendered.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entry_aligns_names() {
        let mut entry = Entry::new("article", "smith2020");
        entry.insert_field("title", "A Study");
        entry.insert_field("year", "2020");
        let expected = "@article{smith2020,\n    title = {A Study},\n    year  = {2020},\n}";
        assert_eq!(format_entry(&entry), expected);
    }

    #[test]
    fn test_format_entry_no_fields() {
        let entry = Entry::new("misc", "empty");
        assert_eq!(format_entry(&entry), "@misc{empty,\n}");
    }

    #[test]
    fn test_format_document_trailing_newline() {
        let mut a = Entry::new("misc", "a");
        a.insert_field("title", "A");
        let mut b = Entry::new("misc", "b");
        b.insert_field("title", "B");
        let doc = format_document(&[a, b]);
        assert!(doc.ends_with("},\n}\n"));
        // One blank-free newline between the entries
        assert!(doc.contains("}\n@misc{b,"));
    }

    #[test]
    fn test_format_document_empty() {
        assert_eq!(format_document(&[]), "");
    }

    #[test]
    fn test_format_preserves_field_order() {
        let mut entry = Entry::new("article", "a");
        entry.insert_field("year", "2020");
        entry.insert_field("author", "X");
        entry.insert_field("title", "T");
        let text = format_entry(&entry);
        let year_pos = text.find("year").unwrap();
        let author_pos = text.find("author").unwrap();
        let title_pos = text.find("title").unwrap();
        assert!(year_pos < author_pos && author_pos < title_pos);
    }
}

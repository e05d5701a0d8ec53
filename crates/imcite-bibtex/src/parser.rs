//! BibTeX parser
//!
//! Entry heads are parsed with nom; entry bodies are sliced with the
//! quote-aware brace scanner. Document parsing is tolerant: entries that
//! cannot be parsed are dropped and scanning resumes at the next `@`.
//! [`parse_entry`] is the strict single-entry variant used when one record's
//! text is edited in place; it reports why the text was rejected instead of
//! discarding it.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    IResult,
};

use crate::entry::Entry;
use crate::error::ParseError;
use crate::scanner::{find_matching_brace, strip_comments};

/// Parse every well-formed entry in a document, skipping malformed ones.
pub fn parse_document(input: &str) -> Vec<Entry> {
    let text = strip_comments(input);
    let mut entries = Vec::new();
    let mut offset = 0;
    while let Some(at) = text[offset..].find('@') {
        let start = offset + at;
        match parse_at(&text, start) {
            Ok((next, entry)) => {
                entries.push(entry);
                offset = next;
            }
            // Resume scanning just past this '@'.
            Err(_) => offset = start + 1,
        }
    }
    entries
}

/// Parse the first entry in the input, failing on malformed bodies.
///
/// Text before the first entry head is skipped as in [`parse_document`],
/// but an unterminated body or field value is an error here rather than a
/// reason to drop the entry.
pub fn parse_entry(input: &str) -> Result<Entry, ParseError> {
    let text = strip_comments(input);
    let mut offset = 0;
    while let Some(at) = text[offset..].find('@') {
        let start = offset + at;
        match parse_at(&text, start) {
            Ok((_, entry)) => return Ok(entry),
            Err(ParseError::NoEntry) => offset = start + 1,
            Err(e) => return Err(e),
        }
    }
    Err(ParseError::NoEntry)
}

/// Parse one entry whose `@` sits at byte offset `at` in `text`.
///
/// On success returns the offset just past the entry's closing brace,
/// together with the entry.
fn parse_at(text: &str, at: usize) -> Result<(usize, Entry), ParseError> {
    let (rest, (kind, key)) = entry_head(&text[at..]).map_err(|_| ParseError::NoEntry)?;
    let body_start = text.len() - rest.len();
    let close =
        find_matching_brace(text, body_start).ok_or_else(|| ParseError::UnterminatedEntry {
            key: key.to_string(),
        })?;

    let mut entry = Entry::new(kind, key);
    for (name, value) in parse_fields(&text[body_start..close])? {
        entry.insert_field(&name, &value);
    }
    Ok((close + 1, entry))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse `@kind{key,` and return (kind, trimmed key).
///
/// The key runs up to the first comma; an entry without a comma after its
/// key has no fields and is not accepted.
fn entry_head(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = char('@')(input)?;
    let (input, kind) = take_while1(is_word_char)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('{')(input)?;
    let (input, key) = take_while1(|c| c != ',')(input)?;
    let (input, _) = char(',')(input)?;
    Ok((input, (kind, key.trim())))
}

/// Split an entry body into (name, value) pairs in source order.
///
/// Anything that does not look like `name = value` is skipped and the scan
/// resumes one character further on, so stray tokens between fields do not
/// lose the fields after them. An unterminated `{` or `"` value fails the
/// whole body.
fn parse_fields(body: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut fields = Vec::new();
    let mut offset = 0;
    while let Some(at) = body[offset..].find(is_word_char) {
        let candidate = &body[offset + at..];
        match parse_field(candidate)? {
            Some((rest, name, value)) => {
                fields.push((name, value));
                offset = body.len() - rest.len();
            }
            None => {
                offset += at + candidate.chars().next().map_or(1, |c| c.len_utf8());
            }
        }
    }
    Ok(fields)
}

/// Try to parse `name = value` at the start of the input.
///
/// Returns the remaining input after the value on success, `None` when the
/// input does not start a field, or an error for an unterminated delimiter.
fn parse_field(input: &str) -> Result<Option<(&str, String, String)>, ParseError> {
    let Ok((rest, name)) = field_name(input) else {
        return Ok(None);
    };
    let rest = rest.trim_start();

    if let Some(inner) = rest.strip_prefix('{') {
        let end = braced_value_end(inner).ok_or_else(|| ParseError::UnterminatedValue {
            field: name.to_string(),
        })?;
        let value = normalize_value(&inner[..end]);
        Ok(Some((&inner[end + 1..], name.to_string(), value)))
    } else if let Some(inner) = rest.strip_prefix('"') {
        let end = inner.find('"').ok_or_else(|| ParseError::UnterminatedValue {
            field: name.to_string(),
        })?;
        let value = normalize_value(&inner[..end]);
        Ok(Some((&inner[end + 1..], name.to_string(), value)))
    } else {
        // Bare value: runs to the next comma or closing brace.
        let end = rest
            .find(|c| c == ',' || c == '}')
            .unwrap_or(rest.len());
        if end == 0 {
            return Ok(None);
        }
        let value = normalize_value(&rest[..end]);
        Ok(Some((&rest[end..], name.to_string(), value)))
    }
}

/// Parse a field name followed by `=`.
fn field_name(input: &str) -> IResult<&str, &str> {
    let (input, name) = take_while1(is_word_char)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('=')(input)?;
    Ok((input, name))
}

/// Byte index of the `}` closing a braced value opened just before the
/// input. Braces are matched by depth alone; quotes are not special inside
/// a braced value.
fn braced_value_end(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in input.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn normalize_value(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

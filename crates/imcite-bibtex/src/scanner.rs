//! Character-level scanning helpers shared by the parser.

/// Find the byte index of the `}` closing a brace group that is already open.
///
/// Scanning starts at `from` with one brace counted as open. A double quote
/// toggles an in-string state in which braces are ignored; a quote directly
/// preceded by a backslash does not toggle. Returns `None` if the group never
/// closes.
pub fn find_matching_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut in_quotes = false;
    for i in from..bytes.len() {
        let c = bytes[i];
        if c == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
            in_quotes = !in_quotes;
        }
        if !in_quotes {
            if c == b'{' {
                depth += 1;
            } else if c == b'}' {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }
    None
}

/// Strip line comments: an unescaped `%` and everything after it up to the
/// end of the line. `\%` is a literal percent sign. Newlines are kept so the
/// remaining text keeps its line structure.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = '\0';
    let mut in_comment = false;
    for c in text.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                out.push(c);
            }
        } else if c == '%' && prev != '\\' {
            in_comment = true;
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

use crate::bytes::{is_space, trim_space};

pub const EMPTY_TOKEN: &str = "<empty>";
pub const NUM_TOKEN: &str = "<num>";

/// Trims, collapses inner whitespace runs to a single space, then replaces
/// each run of ASCII digits with `<num>`. A blank line becomes `<empty>`.
/// Bytes outside ASCII pass through untouched.
pub fn normalize_bytes(line: &[u8]) -> Vec<u8> {
    let trimmed = trim_space(line);
    if trimmed.is_empty() { return EMPTY_TOKEN.as_bytes().to_vec(); }

    let mut out = Vec::with_capacity(trimmed.len());
    let mut prev_space = false;
    let mut in_number = false;
    for &b in trimmed {
        if is_space(b) {
            if !prev_space { out.push(b' '); }
            prev_space = true;
            in_number = false;
            continue;
        }
        prev_space = false;
        if b.is_ascii_digit() {
            if !in_number { out.extend_from_slice(NUM_TOKEN.as_bytes()); }
            in_number = true;
        } else {
            in_number = false;
            out.push(b);
        }
    }
    out
}

/// [`normalize_bytes`] for text input.
pub fn normalize_line(line: &str) -> String {
    // only ASCII bytes are rewritten, so UTF-8 input stays UTF-8
    String::from_utf8_lossy(&normalize_bytes(line.as_bytes())).into_owned()
}

//! Response header parsing
//!
//! Header names are stored in title case (`x-ratelimit-limit` becomes
//! `X-Ratelimit-Limit`) and values are trimmed.

use std::collections::HashMap;

/// Title-case a header name: lowercase everything, then uppercase the first
/// letter of each `-` separated word.
#[must_use]
pub fn normalize_header_name(name: &str) -> String {
    name.trim()
        .split('-')
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse raw `Name: value` lines.
///
/// The split happens at the first colon so values containing colons survive
/// intact. Lines without a colon are ignored and later duplicates overwrite
/// earlier ones.
pub fn parse_header_lines<I, S>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let (name, value) = line.as_ref().split_once(':')?;
            let name = normalize_header_name(name);
            (!name.is_empty()).then(|| (name, value.trim().to_string()))
        })
        .collect()
}

/// Parse a raw header block: the status line followed by header lines,
/// separated by `\r\n` or `\n`.
pub fn parse_header_block(block: &str) -> HashMap<String, String> {
    let mut lines = block.lines();
    let first = lines.next();
    let status_skipped = first.filter(|line| !line.trim_start().starts_with("HTTP/"));
    parse_header_lines(status_skipped.into_iter().chain(lines))
}

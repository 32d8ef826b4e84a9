//! Descriptor mini-language.
//!
//! A descriptor string holds one or more entries separated by `|` or newlines:
//!
//! ```text
//! [Nightly]bamboo:http://ci.example.com:8085/browse/NIGHTLY | http://hudson/job/app
//! ```
//!
//! Each entry has an optional bracketed title, an optional system prefix and
//! a URL. A backslash escapes separators everywhere and brackets inside the
//! title. Parsing never fails; unparsable pieces degrade to defaults.

use crate::descriptor::{recognized_system, CiSourceDescriptor, DEFAULT_SYSTEM};

const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Normal,
    Escaped,
}

/// Parses every entry of a descriptor string, in input order.
pub fn parse_all(input: &str) -> Vec<CiSourceDescriptor> {
    split_entries(input)
        .iter()
        .map(|entry| parse_entry(entry))
        .collect()
}

/// Escapes a title so that it survives a trip through [`parse_all`].
///
/// A title ending in a backslash cannot be expressed.
pub fn escape_title(title: &str) -> String {
    let mut escaped = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '[' | ']' | '|' | '\n') {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn split_entries(input: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut state = Scan::Normal;

    for c in input.chars() {
        match (state, c) {
            (Scan::Escaped, '|' | '\n') => {
                current.push(c);
                state = Scan::Normal;
            }
            // The earlier backslash was literal; this one may still escape.
            (Scan::Escaped, ESCAPE) => current.push(ESCAPE),
            (Scan::Escaped, _) => {
                current.push(ESCAPE);
                current.push(c);
                state = Scan::Normal;
            }
            (Scan::Normal, ESCAPE) => state = Scan::Escaped,
            (Scan::Normal, '|' | '\n') => push_entry(&mut entries, &mut current),
            (Scan::Normal, _) => current.push(c),
        }
    }

    if state == Scan::Escaped {
        current.push(ESCAPE);
    }
    push_entry(&mut entries, &mut current);

    entries
}

fn push_entry(entries: &mut Vec<String>, current: &mut String) {
    let entry = current.trim();
    if !entry.is_empty() {
        entries.push(entry.to_string());
    }
    current.clear();
}

fn parse_entry(entry: &str) -> CiSourceDescriptor {
    let (title, rest) = split_title(entry).unwrap_or_else(|| (String::new(), entry));
    let (system, url) = split_system(rest);

    CiSourceDescriptor::new(title, system, url)
}

/// Splits a leading `[title]` off an entry.
///
/// Returns `None` when the entry has no leading bracket or the bracket is
/// never closed; the caller then treats the whole entry as the rest.
fn split_title(entry: &str) -> Option<(String, &str)> {
    let body = entry.strip_prefix('[')?;
    let mut title = String::new();
    let mut state = Scan::Normal;

    for (offset, c) in body.char_indices() {
        match (state, c) {
            (Scan::Escaped, '[' | ']' | '|') => {
                title.push(c);
                state = Scan::Normal;
            }
            (Scan::Escaped, ESCAPE) => title.push(ESCAPE),
            (Scan::Escaped, _) => {
                title.push(ESCAPE);
                title.push(c);
                state = Scan::Normal;
            }
            (Scan::Normal, ESCAPE) => state = Scan::Escaped,
            (Scan::Normal, ']') => return Some((title, &body[offset + c.len_utf8()..])),
            (Scan::Normal, _) => title.push(c),
        }
    }

    None
}

/// Splits an optional `system:` prefix off the rest of an entry.
fn split_system(rest: &str) -> (&'static str, &str) {
    let (head, tail) = rest.split_once(':').unwrap_or((rest, ""));

    match recognized_system(head) {
        Some(system) => (system, tail.trim()),
        None => (DEFAULT_SYSTEM, rest.trim()),
    }
}

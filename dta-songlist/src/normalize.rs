//! String normalization for song metadata
//!
//! Two independent transforms:
//! - [`to_display`]: text written into reports (escapes decoded, control
//!   characters turned into spaces, trimmed)
//! - [`to_comparison_key`]: identity used for deduplication and diffing,
//!   never shown to the user

use std::borrow::Cow;

/// Characters dropped from comparison keys
const KEY_STRIPPED_CHARS: &[char] = &['"', '\'', '.', ','];

/// Decode one level of DTA string escapes.
///
/// `\q` is the game's spelling of an embedded double quote. Unknown
/// sequences and a trailing lone backslash are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.peek() {
            Some('q') | Some('"') => Some('"'),
            Some('\'') => Some('\''),
            Some('\\') => Some('\\'),
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            _ => None,
        };
        match decoded {
            Some(d) => {
                out.push(d);
                chars.next();
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Replace control characters (decoded `\n`, `\t`, `\r`) with spaces so a
/// display string always fits on one report line.
fn flatten_controls(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect(),
    )
}

/// Display form: escapes decoded, control characters turned into spaces,
/// surrounding whitespace removed.
///
/// Case and interior punctuation are preserved. Decoding runs to a fixed
/// point so the transform is idempotent even for doubly escaped text.
pub fn to_display(s: &str) -> String {
    let mut current = flatten_controls(s).trim().to_string();
    loop {
        let next = flatten_controls(&unescape(&current)).trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Comparison key: display form without quotes/periods/commas, whitespace
/// runs collapsed to single spaces, lowercased.
///
/// A backslash left over after decoding counts as a word break, so the key
/// never spells a new escape sequence once punctuation is removed.
pub fn to_comparison_key(s: &str) -> String {
    let display = to_display(s);
    let stripped: String = display
        .chars()
        .filter(|c| !KEY_STRIPPED_CHARS.contains(c))
        .map(|c| if c == '\\' { ' ' } else { c })
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

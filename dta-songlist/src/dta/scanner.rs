//! Top-level entry splitting
//!
//! A single left-to-right pass over the raw catalog text that yields each
//! balanced top-level `( ... )` entry. Parentheses inside double-quoted
//! strings, single-quoted atoms and `;` line comments are ignored.
//!
//! All delimiters are ASCII, so the scan works on bytes and only ever
//! slices the text at delimiter positions.

use std::ops::Range;

/// Index of the quote closing the double-quoted string opening at `open`.
/// A backslash escapes exactly the next byte. `None` when unterminated.
pub(crate) fn closing_double_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Index just past the double-quoted string opening at `open`.
/// Unterminated strings run to the end of input.
pub(crate) fn skip_double_quoted(bytes: &[u8], open: usize) -> usize {
    closing_double_quote(bytes, open).map_or(bytes.len(), |close| close + 1)
}

/// Index just past the closing quote of the single-quoted atom opening at
/// `open`. No escape processing.
pub(crate) fn skip_single_quoted(bytes: &[u8], open: usize) -> usize {
    match bytes[open + 1..].iter().position(|&b| b == b'\'') {
        Some(offset) => open + 1 + offset + 1,
        None => bytes.len(),
    }
}

/// Index of the end of the `;` comment starting at `start` (the newline,
/// or end of input).
pub(crate) fn skip_comment(bytes: &[u8], start: usize) -> usize {
    match bytes[start..].iter().position(|&b| b == b'\n') {
        Some(offset) => start + offset,
        None => bytes.len(),
    }
}

/// Byte ranges of the top-level entries in `text`, in source order.
///
/// Recovery policy for malformed input: a stray `)` at depth zero is
/// skipped; an entry still open at end of input (including one swallowed by
/// an unterminated string) is not emitted.
#[derive(Debug, Clone)]
pub struct EntrySpans<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for EntrySpans<'a> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.bytes;
        let mut depth: usize = 0;
        let mut start: Option<usize> = None;

        while self.pos < bytes.len() {
            let i = self.pos;
            match bytes[i] {
                b'"' => {
                    self.pos = skip_double_quoted(bytes, i);
                    continue;
                }
                b'\'' => {
                    self.pos = skip_single_quoted(bytes, i);
                    continue;
                }
                b';' => {
                    self.pos = skip_comment(bytes, i);
                    continue;
                }
                b'(' => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                b')' => {
                    if depth == 0 {
                        // Stray close paren
                        start = None;
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            if let Some(s) = start.take() {
                                self.pos = i + 1;
                                return Some(s..i + 1);
                            }
                        }
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }

        if depth > 0 {
            tracing::debug!(
                offset = start.unwrap_or_default(),
                "Dropping unterminated entry at end of input"
            );
        }
        None
    }
}

/// Top-level entry texts of `text`, in source order.
///
/// The sequence is lazy and restartable: clone it, or call again.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    text: &'a str,
    spans: EntrySpans<'a>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.spans.next()?;
        Some(&self.text[span])
    }
}

/// Byte ranges of each top-level entry
pub fn entry_spans(text: &str) -> EntrySpans<'_> {
    EntrySpans {
        bytes: text.as_bytes(),
        pos: 0,
    }
}

/// Split raw catalog text into top-level entry substrings
pub fn split_entries(text: &str) -> Entries<'_> {
    Entries {
        text,
        spans: entry_spans(text),
    }
}

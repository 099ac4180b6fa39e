//! Reverse parsing of a previously written by-artist report
//!
//! Recovers `(artist, title)` from lines rendered by
//! [`super::line::render_artist_line`]:
//!
//! ```text
//! Artist (Album) - Title (Year / M:SS)
//! ```
//!
//! 1. The details block is the last `" ("` followed by a digit, `?` or `/`.
//! 2. The title starts after the last `" - "` whose artist side has
//!    balanced parentheses, so parentheses inside the title (`Smile :)`)
//!    never hide the separator.
//! 3. A trailing parenthesized group on the artist side is the album; it is
//!    matched backward from its final `)` so albums with their own
//!    parentheses are stripped whole.
//!
//! A title or artist that itself ends in a parenthetical starting with a
//! digit can still be mistaken for the details block.

use super::{ADDED_HEADING, COUNT_INDENT, GENERATED_LABEL};
use crate::catalog::IdentityKey;
use crate::normalize::to_display;
use std::collections::{BTreeMap, HashMap};

const SEPARATOR: &str = " - ";

/// Raw artist/title text recovered from one report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredSong {
    pub artist: String,
    pub title: String,
}

impl RecoveredSong {
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(&self.artist, &self.title)
    }
}

fn find_details_block(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    line.rmatch_indices(" (")
        .map(|(idx, _)| idx)
        .find(|&idx| {
            matches!(bytes.get(idx + 2), Some(b) if b.is_ascii_digit() || matches!(b, b'?' | b'/'))
        })
}

/// Parentheses close in order and none is left open
fn is_balanced(s: &str) -> bool {
    let mut depth = 0usize;
    for b in s.bytes() {
        match b {
            b'(' => depth += 1,
            b')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Index of the `" - "` splitting artist side from title: the last one with
/// a balanced artist side, else the last one.
fn title_separator(head: &str) -> Option<usize> {
    let mut candidates = head.rmatch_indices(SEPARATOR).map(|(idx, _)| idx);
    let last = candidates.next()?;
    if is_balanced(&head[..last]) {
        return Some(last);
    }
    Some(
        candidates
            .find(|&idx| is_balanced(&head[..idx]))
            .unwrap_or(last),
    )
}

/// Drop a trailing ` (...)` group, balancing nested parentheses
fn strip_album_group(artist_side: &str) -> &str {
    let trimmed = artist_side.trim_end();
    if !trimmed.ends_with(')') {
        return trimmed;
    }

    let bytes = trimmed.as_bytes();
    let mut depth = 0usize;
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b')' => depth += 1,
            b'(' => {
                depth -= 1;
                if depth == 0 {
                    return if i > 0 && bytes[i - 1] == b' ' {
                        trimmed[..i - 1].trim_end()
                    } else {
                        trimmed
                    };
                }
            }
            _ => {}
        }
    }
    trimmed
}

/// Recover raw artist and title from one by-artist line
pub fn parse_artist_line(line: &str) -> Option<RecoveredSong> {
    let line = line.trim();
    if !line.ends_with(')') {
        return None;
    }

    let block = find_details_block(line)?;
    let head = &line[..block];
    let separator = title_separator(head)?;

    let artist = strip_album_group(&head[..separator]).trim();
    let title = head[separator + SEPARATOR.len()..].trim();
    if artist.is_empty() || title.is_empty() {
        return None;
    }

    Some(RecoveredSong {
        artist: artist.to_string(),
        title: title.to_string(),
    })
}

/// Parse an `<artist>: <count>` header line
fn parse_count_line(item: &str) -> Option<(String, usize)> {
    let (artist, count) = item.trim().rsplit_once(": ")?;
    let count = count.trim().parse().ok()?;
    let artist = to_display(artist);
    if artist.is_empty() {
        return None;
    }
    Some((artist, count))
}

/// Song identities and header counts recovered from the previous run
#[derive(Debug, Clone, Default)]
pub struct PreviousReport {
    songs: HashMap<IdentityKey, String>,
    carried_forward: BTreeMap<String, usize>,
    parsed_lines: usize,
    skipped_lines: usize,
}

impl PreviousReport {
    /// Parse a by-artist report's text.
    ///
    /// Lines that cannot be reverse-parsed are counted and skipped.
    pub fn parse(text: &str) -> Self {
        let mut report = Self::default();
        let mut lines = text.lines().peekable();

        if lines
            .peek()
            .is_some_and(|first| first.starts_with(GENERATED_LABEL))
        {
            let mut in_added_section = false;
            for line in lines.by_ref() {
                if line.trim().is_empty() {
                    break;
                }
                if line.trim_end() == ADDED_HEADING {
                    in_added_section = true;
                    continue;
                }
                if let Some(item) = line.strip_prefix(COUNT_INDENT) {
                    if in_added_section {
                        if let Some((artist, count)) = parse_count_line(item) {
                            *report.carried_forward.entry(artist).or_insert(0) += count;
                        }
                    }
                    continue;
                }
                in_added_section = false;
            }
        }

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match parse_artist_line(line) {
                Some(song) => {
                    report.parsed_lines += 1;
                    report
                        .songs
                        .entry(song.identity())
                        .or_insert_with(|| to_display(&song.artist));
                }
                None => {
                    report.skipped_lines += 1;
                    tracing::debug!(line = %line, "Skipping unparseable previous report line");
                }
            }
        }

        report
    }

    /// Identity keys mapped to the display artist recovered from the report
    pub fn songs(&self) -> &HashMap<IdentityKey, String> {
        &self.songs
    }

    /// "New song counts added by artist" from the report header
    pub fn carried_forward(&self) -> &BTreeMap<String, usize> {
        &self.carried_forward
    }

    pub fn parsed_lines(&self) -> usize {
        self.parsed_lines
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Song lines were present but none parsed (likely a format change)
    pub fn is_unrecognized(&self) -> bool {
        self.parsed_lines == 0 && self.skipped_lines > 0
    }
}

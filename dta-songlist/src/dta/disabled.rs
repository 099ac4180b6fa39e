//! Commented-out song extraction
//!
//! Large song catalogs are trimmed by commenting whole entries out line by
//! line:
//!
//! ```text
//! ; (
//! ;    'songid'
//! ;    ('name' "Title")
//! ; )
//! ```
//!
//! This module moves such blocks out of the active catalog text. Block
//! boundaries are found by un-commenting lines and balancing parentheses
//! with the regular entry scanner, so nested lists inside the block do not
//! end it early.

use super::extractor::EntryFields;
use super::projector::{ALBUM_KEYS, ARTIST_KEYS, TITLE_KEYS};
use super::scanner::split_entries;
use crate::normalize::to_display;

/// One commented-out song block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledSong {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Original (still commented) lines of the block
    pub lines: Vec<String>,
}

/// Result of [`extract_disabled`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledExtraction {
    /// Input text without the disabled blocks
    pub active_text: String,
    pub disabled: Vec<DisabledSong>,
}

/// Strip one leading `;` (after indentation) from a commented line
fn uncomment(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(';')
}

fn is_block_start(lines: &[&str], i: usize) -> bool {
    let opens = uncomment(lines[i]).map(str::trim) == Some("(");
    let names_song = lines
        .get(i + 1)
        .and_then(|next| uncomment(next))
        .map(str::trim)
        .is_some_and(|id| id.len() >= 2 && id.starts_with('\'') && id.ends_with('\''));
    opens && names_song
}

/// Index of the line closing the block that starts at `start`
fn find_block_end(lines: &[&str], start: usize) -> Option<usize> {
    let mut uncommented = String::new();
    for (j, line) in lines.iter().enumerate().skip(start) {
        let content = uncomment(line)?;
        uncommented.push_str(content);
        uncommented.push('\n');
        if split_entries(&uncommented).next().is_some() {
            return Some(j);
        }
    }
    None
}

impl DisabledSong {
    fn from_block(block: &[&str]) -> Self {
        let uncommented: String = block
            .iter()
            .filter_map(|line| uncomment(line))
            .flat_map(|content| [content, "\n"])
            .collect();

        let mut song = DisabledSong {
            lines: block.iter().map(|line| line.to_string()).collect(),
            ..Default::default()
        };
        if let Some(entry) = split_entries(&uncommented).next() {
            let fields = EntryFields::parse(entry);
            song.identifier = fields.identifier().map(str::to_string);
            song.title = fields.first_of(TITLE_KEYS).map(to_display);
            song.artist = fields.first_of(ARTIST_KEYS).map(to_display);
            song.album = fields.first_of(ALBUM_KEYS).map(to_display);
        }
        song
    }
}

/// Split catalog text into active text and commented-out song blocks.
///
/// A block that never closes is left in the active text untouched.
pub fn extract_disabled(text: &str) -> DisabledExtraction {
    let lines: Vec<&str> = text.lines().collect();
    let mut active: Vec<&str> = Vec::with_capacity(lines.len());
    let mut disabled = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if is_block_start(&lines, i) {
            if let Some(end) = find_block_end(&lines, i) {
                let song = DisabledSong::from_block(&lines[i..=end]);
                tracing::info!(
                    title = song.title.as_deref().unwrap_or("Unknown"),
                    artist = song.artist.as_deref().unwrap_or("Unknown"),
                    album = song.album.as_deref().unwrap_or("Unknown"),
                    identifier = song.identifier.as_deref().unwrap_or("?"),
                    "Found commented-out song"
                );
                disabled.push(song);
                i = end + 1;
                continue;
            }
        }
        active.push(lines[i]);
        i += 1;
    }

    let mut active_text = String::with_capacity(text.len());
    for line in active {
        active_text.push_str(line);
        active_text.push('\n');
    }

    DisabledExtraction {
        active_text,
        disabled,
    }
}

/// Render the disabled blocks as a standalone DTA file
pub fn render_disabled_file(songs: &[DisabledSong], source_name: &str) -> String {
    let mut out = String::new();
    out.push_str("; This file contains song definitions that were commented out\n");
    out.push_str(&format!("; from {}\n", source_name));
    out.push_str(&format!("; Total disabled songs: {}\n\n", songs.len()));
    for song in songs {
        for line in &song.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "\
(active1
   ('name' \"Kept\")
   ('artist' \"Band\")
)
; (
;    'gone1'
;    ('name'
;       \"Removed Song\"
;    )
;    ('artist' \"Gone Band\")
;    ('song' ('name' \"songs/gone1/gone1\"))
;    ('album_name' \"Gone Album\")
; )
(active2 ('name' \"Also Kept\") ('artist' \"Band\"))
";

    #[test]
    fn test_extracts_commented_block() {
        let extraction = extract_disabled(CATALOG);
        assert_eq!(extraction.disabled.len(), 1);

        let song = &extraction.disabled[0];
        assert_eq!(song.identifier.as_deref(), Some("gone1"));
        assert_eq!(song.title.as_deref(), Some("Removed Song"));
        assert_eq!(song.artist.as_deref(), Some("Gone Band"));
        assert_eq!(song.album.as_deref(), Some("Gone Album"));
        assert_eq!(song.lines.len(), 9);
        assert_eq!(song.lines.last().map(String::as_str), Some("; )"));
    }

    #[test]
    fn test_active_text_keeps_live_entries() {
        let extraction = extract_disabled(CATALOG);
        let active: Vec<_> = split_entries(&extraction.active_text).collect();
        assert_eq!(active.len(), 2);
        assert!(!extraction.active_text.contains("gone1"));
    }

    #[test]
    fn test_plain_comments_stay_active() {
        let text = "; just a note\n; (\n; not followed by an id\n(a ('name' \"x\"))\n";
        let extraction = extract_disabled(text);
        assert!(extraction.disabled.is_empty());
        assert_eq!(extraction.active_text, text);
    }

    #[test]
    fn test_unterminated_block_left_in_place() {
        let text = "; (\n;    'half'\n;    ('name' \"x\")\n(real)\n";
        let extraction = extract_disabled(text);
        assert!(extraction.disabled.is_empty());
        assert_eq!(extraction.active_text, text);
    }

    #[test]
    fn test_render_disabled_file() {
        let extraction = extract_disabled(CATALOG);
        let rendered = render_disabled_file(&extraction.disabled, "songs.dta");
        assert!(rendered.starts_with("; This file contains song definitions"));
        assert!(rendered.contains("; Total disabled songs: 1\n"));
        assert!(rendered.contains(";    'gone1'\n"));
    }
}

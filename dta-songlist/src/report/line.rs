//! Song line rendering
//!
//! The by-artist layout is parsed back by [`super::reverse`] on the next
//! run; change both together.

use crate::catalog::SongRecord;
use dta_common::human_time::{format_song_length_opt, UNKNOWN_PLACEHOLDER};

/// `(Year / M:SS)` block closing every song line
pub fn details_block(song: &SongRecord) -> String {
    let year = song
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
    format!("({} / {})", year, format_song_length_opt(song.length_ms))
}

/// Artist with its album group.
///
/// An artist ending in `)` always gets a group (empty when the album is
/// unknown) so the last group on the artist side is always the album.
fn artist_with_album(song: &SongRecord) -> String {
    match &song.album {
        Some(album) => format!("{} ({})", song.artist, album),
        None if song.artist.ends_with(')') => format!("{} ()", song.artist),
        None => song.artist.clone(),
    }
}

/// `Artist (Album) - Title (Year / M:SS)`
pub fn render_artist_line(song: &SongRecord) -> String {
    format!(
        "{} - {} {}",
        artist_with_album(song),
        song.title,
        details_block(song)
    )
}

/// `Title by Artist (Album) (Year / M:SS)`
pub fn render_title_line(song: &SongRecord) -> String {
    format!(
        "{} by {} {}",
        song.title,
        artist_with_album(song),
        details_block(song)
    )
}

//! Song records and the deduplicated catalog

use crate::normalize::to_comparison_key;
use std::collections::HashSet;

/// Placeholder artist for entries without a resolvable artist
pub const UNKNOWN_ARTIST: &str = "(unknown artist)";

/// Placeholder title for entries without a resolvable title
pub const UNKNOWN_TITLE: &str = "(unknown title)";

/// A song with both artist and title resolved (display-normalized)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub length_ms: Option<i64>,
}

/// An entry missing its artist and/or title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub length_ms: Option<i64>,
}

impl PartialRecord {
    /// Fill missing artist/title with placeholder text
    pub fn promote(self) -> SongRecord {
        SongRecord {
            artist: self.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            title: self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            album: self.album,
            year: self.year,
            length_ms: self.length_ms,
        }
    }
}

/// Identity of a song for deduplication and diffing.
///
/// Two records with equal keys are the same song even when their display
/// strings differ in case, punctuation or escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub artist: String,
    pub title: String,
}

impl IdentityKey {
    /// Build a key from raw or display artist/title text
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: to_comparison_key(artist),
            title: to_comparison_key(title),
        }
    }
}

impl SongRecord {
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(&self.artist, &self.title)
    }
}

/// Deduplicated songs of one run, in source order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<SongRecord>,
    duplicates_dropped: usize,
    partials_promoted: usize,
}

impl Catalog {
    /// Keep the first complete record per identity key, then append every
    /// promoted partial record.
    ///
    /// Partials are never merged: two title-less entries by the same artist
    /// share a placeholder identity but are still two songs.
    pub fn build(records: Vec<SongRecord>, partials: Vec<PartialRecord>) -> Self {
        let partials_promoted = partials.len();
        let mut seen = HashSet::new();
        let mut songs = Vec::with_capacity(records.len() + partials.len());
        let mut duplicates_dropped = 0;

        for song in records {
            if seen.insert(song.identity()) {
                songs.push(song);
            } else {
                tracing::debug!(
                    artist = %song.artist,
                    title = %song.title,
                    "Dropping duplicate song"
                );
                duplicates_dropped += 1;
            }
        }
        songs.extend(partials.into_iter().map(PartialRecord::promote));

        Self {
            songs,
            duplicates_dropped,
            partials_promoted,
        }
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn partials_promoted(&self) -> usize {
        self.partials_promoted
    }
}

/// Song/album/artist totals over a set of songs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Totals {
    pub songs: usize,
    pub albums: usize,
    pub artists: usize,
}

impl Totals {
    /// Albums are distinct (artist, album) pairs; artists are distinct
    /// artist keys.
    pub fn count<'a>(songs: impl IntoIterator<Item = &'a SongRecord>) -> Self {
        let mut song_count = 0;
        let mut albums = HashSet::new();
        let mut artists = HashSet::new();
        for song in songs {
            song_count += 1;
            let artist_key = to_comparison_key(&song.artist);
            if let Some(album) = &song.album {
                albums.insert((artist_key.clone(), to_comparison_key(album)));
            }
            artists.insert(artist_key);
        }
        Self {
            songs: song_count,
            albums: albums.len(),
            artists: artists.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(artist: &str, title: &str) -> SongRecord {
        SongRecord {
            artist: artist.to_string(),
            title: title.to_string(),
            album: None,
            year: None,
            length_ms: None,
        }
    }

    #[test]
    fn test_identity_ignores_case_and_punctuation() {
        assert_eq!(
            song("The Beatles", "Don't Let Me Down").identity(),
            song("the beatles", "Dont Let Me Down.").identity()
        );
    }

    #[test]
    fn test_dedup_keeps_first() {
        let catalog = Catalog::build(
            vec![
                song("Journey", "Don't Stop Believin'"),
                song("JOURNEY", "dont stop believin"),
                song("Journey", "Separate Ways"),
            ],
            Vec::new(),
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.duplicates_dropped(), 1);
        assert_eq!(catalog.songs()[0].artist, "Journey");
        assert_eq!(catalog.songs()[0].title, "Don't Stop Believin'");
    }

    #[test]
    fn test_partials_promoted_with_placeholders() {
        let partial = PartialRecord {
            artist: Some("Solo Artist".to_string()),
            identifier: Some("song2".to_string()),
            ..Default::default()
        };
        let catalog = Catalog::build(Vec::new(), vec![partial]);
        assert_eq!(catalog.partials_promoted(), 1);
        assert_eq!(catalog.songs()[0].artist, "Solo Artist");
        assert_eq!(catalog.songs()[0].title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_partials_sharing_placeholders_all_kept() {
        let solo = |id: &str| PartialRecord {
            artist: Some("Solo".to_string()),
            identifier: Some(id.to_string()),
            ..Default::default()
        };
        let anonymous = |id: &str| PartialRecord {
            identifier: Some(id.to_string()),
            year: Some(1999),
            ..Default::default()
        };
        let partials = vec![solo("s1"), solo("s2"), anonymous("s3"), anonymous("s4")];

        let catalog = Catalog::build(vec![song("Solo", "Real Song")], partials);
        assert_eq!(catalog.partials_promoted(), 4);
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.duplicates_dropped(), 0);
        assert_eq!(Totals::count(catalog.songs()).songs, 5);
    }

    #[test]
    fn test_totals() {
        let mut a = song("Artist", "One");
        a.album = Some("Album".to_string());
        let mut b = song("artist", "Two");
        b.album = Some("ALBUM".to_string());
        let mut c = song("Other", "Three");
        c.album = Some("Album".to_string());
        let d = song("Other", "Four");

        let totals = Totals::count([&a, &b, &c, &d]);
        assert_eq!(
            totals,
            Totals {
                songs: 4,
                albums: 2,
                artists: 2
            }
        );
    }
}

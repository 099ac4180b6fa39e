//! Entry projection into typed song records
//!
//! Each logical field is resolved from a prioritized list of alternate
//! DTA keys; the first non-empty value wins.

use super::extractor::EntryFields;
use crate::catalog::{PartialRecord, SongRecord};
use crate::normalize::to_display;
use serde::Serialize;

pub const TITLE_KEYS: &[&str] = &["songname", "song_name", "title", "name"];
pub const ARTIST_KEYS: &[&str] = &["artist", "song_artist"];
pub const ALBUM_KEYS: &[&str] = &["album_name"];
pub const YEAR_KEYS: &[&str] = &["year_released", "year"];
pub const LENGTH_KEYS: &[&str] = &["song_length", "length"];

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionStats {
    pub total: usize,
    pub missing_artist: usize,
    pub missing_title: usize,
    pub completed: usize,
}

/// Output of [`project`]
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub records: Vec<SongRecord>,
    pub partials: Vec<PartialRecord>,
    pub stats: ProjectionStats,
}

/// Best-effort integer coercion.
///
/// Accepts plain integers and finite decimals (truncated toward zero);
/// anything else is `None`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn display_field(fields: &EntryFields<'_>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(key))
        .map(to_display)
        .find(|value| !value.is_empty())
}

fn integer_field(fields: &EntryFields<'_>, keys: &[&str]) -> Option<i64> {
    fields.first_of(keys).and_then(parse_integer)
}

/// Project entry texts into complete and partial records
pub fn project<'a, I>(entries: I) -> Projection
where
    I: IntoIterator<Item = &'a str>,
{
    let mut projection = Projection::default();

    for entry in entries {
        let fields = EntryFields::parse(entry);
        projection.stats.total += 1;

        let title = display_field(&fields, TITLE_KEYS);
        let artist = display_field(&fields, ARTIST_KEYS);
        let album = display_field(&fields, ALBUM_KEYS);
        let year = integer_field(&fields, YEAR_KEYS).and_then(|y| i32::try_from(y).ok());
        let length_ms = integer_field(&fields, LENGTH_KEYS);

        match (artist, title) {
            (Some(artist), Some(title)) => {
                projection.stats.completed += 1;
                projection.records.push(SongRecord {
                    artist,
                    title,
                    album,
                    year,
                    length_ms,
                });
            }
            (artist, title) => {
                if artist.is_none() {
                    projection.stats.missing_artist += 1;
                }
                if title.is_none() {
                    projection.stats.missing_title += 1;
                }
                let identifier = fields.identifier().map(str::to_string);
                tracing::debug!(
                    identifier = ?identifier,
                    artist = ?artist,
                    title = ?title,
                    "Entry missing artist or title"
                );
                projection.partials.push(PartialRecord {
                    artist,
                    title,
                    identifier,
                    album,
                    year,
                    length_ms,
                });
            }
        }
    }

    projection
}

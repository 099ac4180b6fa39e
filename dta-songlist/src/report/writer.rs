//! Report rendering and output
//!
//! Four variants are produced in one pass: by-artist and by-title, each in
//! a full and a profanity-filtered ("clean") form. Totals in each header are
//! computed from the lines actually written into that variant.

use super::filter::FilterTerms;
use super::line::{render_artist_line, render_title_line};
use super::{
    ADDED_HEADING, COUNT_INDENT, GENERATED_LABEL, REMOVED_HEADING, TOTAL_ALBUMS_LABEL,
    TOTAL_ARTISTS_LABEL, TOTAL_SONGS_LABEL,
};
use crate::catalog::{SongRecord, Totals};
use crate::differ::CatalogDiff;
use dta_common::config::ReportNames;
use dta_common::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sort order of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    ByArtist,
    ByTitle,
}

/// One rendered report variant
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub kind: ReportKind,
    pub clean: bool,
    pub text: String,
    /// Song lines written
    pub written: usize,
    /// Song lines left out by the profanity filter
    pub filtered: usize,
    pub totals: Totals,
}

impl RenderedReport {
    /// Configured file name of this variant
    pub fn file_name<'n>(&self, names: &'n ReportNames) -> &'n str {
        match (self.kind, self.clean) {
            (ReportKind::ByArtist, false) => &names.by_artist,
            (ReportKind::ByTitle, false) => &names.by_title,
            (ReportKind::ByArtist, true) => &names.by_artist_clean,
            (ReportKind::ByTitle, true) => &names.by_title_clean,
        }
    }
}

/// The four report variants of one run
#[derive(Debug, Clone)]
pub struct ReportSet {
    pub by_artist: RenderedReport,
    pub by_title: RenderedReport,
    pub by_artist_clean: RenderedReport,
    pub by_title_clean: RenderedReport,
}

impl ReportSet {
    pub fn iter(&self) -> impl Iterator<Item = &RenderedReport> {
        [
            &self.by_artist,
            &self.by_title,
            &self.by_artist_clean,
            &self.by_title_clean,
        ]
        .into_iter()
    }

    /// Write every variant into `dir`, returning the paths written
    pub fn write_to(&self, dir: &Path, names: &ReportNames) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(4);
        for report in self.iter() {
            let path = dir.join(report.file_name(names));
            std::fs::write(&path, &report.text)?;
            tracing::info!(
                path = %path.display(),
                songs = report.written,
                filtered = report.filtered,
                "Wrote report"
            );
            written.push(path);
        }
        Ok(written)
    }
}

/// Songs ordered by (artist, album, title), case-insensitive
pub fn sort_by_artist(songs: &[SongRecord]) -> Vec<&SongRecord> {
    let mut sorted: Vec<&SongRecord> = songs.iter().collect();
    sorted.sort_by_cached_key(|s| {
        (
            s.artist.to_lowercase(),
            s.album.as_deref().unwrap_or("").to_lowercase(),
            s.title.to_lowercase(),
        )
    });
    sorted
}

/// Songs ordered by (title, artist), case-insensitive
pub fn sort_by_title(songs: &[SongRecord]) -> Vec<&SongRecord> {
    let mut sorted: Vec<&SongRecord> = songs.iter().collect();
    sorted.sort_by_cached_key(|s| (s.title.to_lowercase(), s.artist.to_lowercase()));
    sorted
}

fn push_counts(out: &mut String, heading: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by_cached_key(|(artist, _)| (artist.to_lowercase(), artist.to_string()));

    out.push_str(heading);
    out.push('\n');
    for (artist, count) in entries {
        out.push_str(&format!("{}{}: {}\n", COUNT_INDENT, artist, count));
    }
}

/// Renders the four report variants
pub struct ReportWriter<'a> {
    filter: &'a FilterTerms,
    generated_at: String,
}

impl<'a> ReportWriter<'a> {
    pub fn new(filter: &'a FilterTerms, generated_at: impl Into<String>) -> Self {
        Self {
            filter,
            generated_at: generated_at.into(),
        }
    }

    fn header(&self, diff: &CatalogDiff, totals: &Totals) -> String {
        let mut out = format!("{} {}\n", GENERATED_LABEL, self.generated_at);
        push_counts(&mut out, ADDED_HEADING, diff.header_added_counts());
        push_counts(&mut out, REMOVED_HEADING, &diff.removed_by_artist);
        out.push_str(&format!("{} {}\n", TOTAL_SONGS_LABEL, totals.songs));
        out.push_str(&format!("{} {}\n", TOTAL_ALBUMS_LABEL, totals.albums));
        out.push_str(&format!("{} {}\n", TOTAL_ARTISTS_LABEL, totals.artists));
        out.push('\n');
        out
    }

    fn render_variant(
        &self,
        kind: ReportKind,
        clean: bool,
        sorted: &[&SongRecord],
        diff: &CatalogDiff,
    ) -> RenderedReport {
        let render = match kind {
            ReportKind::ByArtist => render_artist_line,
            ReportKind::ByTitle => render_title_line,
        };

        let mut kept: Vec<&SongRecord> = Vec::with_capacity(sorted.len());
        let mut body = String::new();
        let mut filtered = 0;
        for &song in sorted {
            let line = render(song);
            if clean && self.filter.is_profane(&line) {
                filtered += 1;
                continue;
            }
            body.push_str(&line);
            body.push('\n');
            kept.push(song);
        }

        let totals = Totals::count(kept.iter().copied());
        let mut text = self.header(diff, &totals);
        text.push_str(&body);

        RenderedReport {
            kind,
            clean,
            text,
            written: kept.len(),
            filtered,
            totals,
        }
    }

    /// Render all four variants
    pub fn render(&self, songs: &[SongRecord], diff: &CatalogDiff) -> ReportSet {
        let by_artist = sort_by_artist(songs);
        let by_title = sort_by_title(songs);

        ReportSet {
            by_artist: self.render_variant(ReportKind::ByArtist, false, &by_artist, diff),
            by_title: self.render_variant(ReportKind::ByTitle, false, &by_title, diff),
            by_artist_clean: self.render_variant(ReportKind::ByArtist, true, &by_artist, diff),
            by_title_clean: self.render_variant(ReportKind::ByTitle, true, &by_title, diff),
        }
    }
}

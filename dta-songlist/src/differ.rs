//! Catalog change detection against the previous run's report

use crate::catalog::{IdentityKey, SongRecord};
use crate::report::reverse::PreviousReport;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Songs added/removed since the previous report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDiff {
    pub added: BTreeSet<IdentityKey>,
    pub removed: BTreeSet<IdentityKey>,
    /// Added songs counted by display artist of the current run
    pub added_by_artist: BTreeMap<String, usize>,
    /// Removed songs counted by display artist recovered from the report
    pub removed_by_artist: BTreeMap<String, usize>,
    /// Added counts from the previous report's header
    pub carried_forward_counts: BTreeMap<String, usize>,
}

impl CatalogDiff {
    /// Counts for the header's "added" section: this run's additions, or
    /// the previous header's counts when nothing was added.
    pub fn header_added_counts(&self) -> &BTreeMap<String, usize> {
        if self.added.is_empty() {
            &self.carried_forward_counts
        } else {
            &self.added_by_artist
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Compare the current songs with the previous report (if any).
///
/// Without a previous report every current song counts as added.
pub fn diff(current: &[SongRecord], previous: Option<&PreviousReport>) -> CatalogDiff {
    let empty = PreviousReport::default();
    let previous = previous.unwrap_or(&empty);

    let mut current_ids: HashMap<IdentityKey, &str> = HashMap::with_capacity(current.len());
    for song in current {
        current_ids
            .entry(song.identity())
            .or_insert(song.artist.as_str());
    }

    let mut result = CatalogDiff {
        carried_forward_counts: previous.carried_forward().clone(),
        ..Default::default()
    };

    for (identity, artist) in &current_ids {
        if !previous.songs().contains_key(identity) {
            result.added.insert(identity.clone());
            *result.added_by_artist.entry(artist.to_string()).or_insert(0) += 1;
        }
    }

    for (identity, artist) in previous.songs() {
        if !current_ids.contains_key(identity) {
            result.removed.insert(identity.clone());
            *result.removed_by_artist.entry(artist.clone()).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        added = result.added.len(),
        removed = result.removed.len(),
        "Computed catalog diff"
    );
    result
}

/// Parse the previous report text and diff against it
pub fn diff_against_text(current: &[SongRecord], previous_report: Option<&str>) -> CatalogDiff {
    let previous = previous_report.map(PreviousReport::parse);
    diff(current, previous.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::line::render_artist_line;

    fn song(artist: &str, title: &str) -> SongRecord {
        SongRecord {
            artist: artist.to_string(),
            title: title.to_string(),
            album: None,
            year: None,
            length_ms: None,
        }
    }

    fn report_of(songs: &[SongRecord]) -> String {
        let mut text = String::from("Generated: 2026-01-01 00:00:00\n\n");
        for s in songs {
            text.push_str(&render_artist_line(s));
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_added_only() {
        let previous = report_of(&[song("a", "x")]);
        let current = [song("a", "x"), song("b", "y")];

        let result = diff_against_text(&current, Some(&previous));
        assert_eq!(
            result.added,
            BTreeSet::from([IdentityKey::new("b", "y")])
        );
        assert!(result.removed.is_empty());
        assert_eq!(result.added_by_artist.get("b"), Some(&1));
    }

    #[test]
    fn test_added_and_removed() {
        let previous = report_of(&[song("a", "x")]);
        let current = [song("b", "y")];

        let result = diff_against_text(&current, Some(&previous));
        assert_eq!(result.added, BTreeSet::from([IdentityKey::new("b", "y")]));
        assert_eq!(result.removed, BTreeSet::from([IdentityKey::new("a", "x")]));
        assert_eq!(result.removed_by_artist.get("a"), Some(&1));
    }

    #[test]
    fn test_first_run_everything_added() {
        let current = [song("Queen", "Bohemian Rhapsody"), song("Queen", "Somebody to Love")];
        let result = diff_against_text(&current, None);
        assert_eq!(result.added.len(), 2);
        assert!(result.removed.is_empty());
        assert_eq!(result.added_by_artist.get("Queen"), Some(&2));
    }

    #[test]
    fn test_display_differences_are_same_song() {
        let previous = report_of(&[song("Guns N' Roses", "Sweet Child O' Mine")]);
        let current = [song("guns n roses", "Sweet Child O Mine")];
        let result = diff_against_text(&current, Some(&previous));
        assert!(!result.has_changes());
    }

    #[test]
    fn test_attribution_uses_each_side_display_name() {
        let previous = report_of(&[song("Old Name", "Gone Song")]);
        let current = [song("New Name", "Fresh Song")];
        let result = diff_against_text(&current, Some(&previous));
        assert_eq!(result.added_by_artist.get("New Name"), Some(&1));
        assert_eq!(result.removed_by_artist.get("Old Name"), Some(&1));
    }

    #[test]
    fn test_carried_forward_used_when_nothing_added() {
        let previous = "Generated: 2026-01-01 00:00:00\n\
                        New song counts added by artist:\n  Queen: 2\n\
                        Total songs: 1\n\n\
                        Queen - Bohemian Rhapsody (1975 / 5:55)\n";
        let current = [song("Queen", "Bohemian Rhapsody")];

        let result = diff_against_text(&current, Some(previous));
        assert!(result.added.is_empty());
        assert_eq!(result.header_added_counts().get("Queen"), Some(&2));
    }

    #[test]
    fn test_new_additions_replace_carried_forward() {
        let previous = "Generated: 2026-01-01 00:00:00\n\
                        New song counts added by artist:\n  Queen: 2\n\n\
                        Queen - Bohemian Rhapsody (1975 / 5:55)\n";
        let current = [song("Queen", "Bohemian Rhapsody"), song("Muse", "Uprising")];

        let result = diff_against_text(&current, Some(previous));
        let counts = result.header_added_counts();
        assert_eq!(counts.get("Muse"), Some(&1));
        assert_eq!(counts.get("Queen"), None);
    }
}

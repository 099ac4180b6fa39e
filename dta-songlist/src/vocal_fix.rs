//! Vocal overhang fix for console song archives
//!
//! Authoring tools reject a harmony vocal note that runs past the end of
//! its phrase. The fix extracts the archive, shortens the offending note by
//! a few milliseconds in each song's timed-event (MIDI) file and repacks the
//! result next to the original as `<stem>_FIXED.con`.

use crate::packer::Packer;
use dta_common::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Amount the offending note is shortened by (inaudible)
pub const SHORTEN_MS: u32 = 10;

/// Track searched when none is given
pub const DEFAULT_TRACK: &str = "PART HARM1";

/// Song position as `MEASURE:BEAT`, e.g. `49:4.300`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteLocation {
    pub measure: u32,
    pub beat: f64,
}

impl FromStr for NoteLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::InvalidInput(format!(
                "Invalid note location '{}', expected MEASURE:BEAT (e.g. 49:4.300)",
                s
            ))
        };

        let (measure, beat) = s.trim().split_once(':').ok_or_else(invalid)?;
        let measure = measure.trim().parse().map_err(|_| invalid())?;
        let beat: f64 = beat.trim().parse().map_err(|_| invalid())?;
        if !beat.is_finite() || beat < 0.0 {
            return Err(invalid());
        }
        Ok(Self { measure, beat })
    }
}

impl fmt::Display for NoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.measure, self.beat)
    }
}

/// Edits notes in a multi-track timed-event file
pub trait TimedTrackEditor {
    /// Shorten the note near `location` on the track whose text marker
    /// contains `track_marker`. Returns true when a note was shortened.
    fn shorten_note(
        &self,
        midi_path: &Path,
        track_marker: &str,
        location: NoteLocation,
        shorten_ms: u32,
    ) -> Result<bool>;
}

/// Track editor backed by a command-line program:
///
/// ```text
/// <program> <midi> <track> <MEASURE:BEAT> <shorten_ms>
/// ```
///
/// Exit code 0 means a note was shortened, 1 means no matching note.
#[derive(Debug, Clone)]
pub struct ExternalTrackEditor {
    program: String,
}

impl ExternalTrackEditor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TimedTrackEditor for ExternalTrackEditor {
    fn shorten_note(
        &self,
        midi_path: &Path,
        track_marker: &str,
        location: NoteLocation,
        shorten_ms: u32,
    ) -> Result<bool> {
        let output = Command::new(&self.program)
            .arg(midi_path)
            .arg(track_marker)
            .arg(location.to_string())
            .arg(shorten_ms.to_string())
            .output()
            .map_err(|e| Error::ExternalTool(format!("Failed to run '{}': {}", self.program, e)))?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(Error::ExternalTool(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// Timed-event file of one extracted song folder: the first `*.mid` by
/// name, else `song.mid`.
fn find_midi(folder: &Path) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mid"))
        })
        .collect();
    candidates.sort();

    if let Some(first) = candidates.into_iter().next() {
        return Ok(Some(first));
    }
    let fallback = folder.join("song.mid");
    Ok(fallback.is_file().then_some(fallback))
}

fn song_folders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();
    Ok(folders)
}

/// `<dir>/<stem>_FIXED.con`
pub fn fixed_archive_path(con: &Path) -> PathBuf {
    let stem = con
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    con.with_file_name(format!("{}_FIXED.con", stem))
}

/// Shorten the note at `location` in every song of `con` and repack.
///
/// Returns the repacked archive, or `None` when no song had a matching
/// note (nothing is written then).
pub fn fix_vocal_overhang(
    con: &Path,
    location: &str,
    track: Option<&str>,
    packer: &dyn Packer,
    editor: &dyn TimedTrackEditor,
) -> Result<Option<PathBuf>> {
    let location: NoteLocation = location.parse()?;
    let track = track.unwrap_or(DEFAULT_TRACK);
    if !con.is_file() {
        return Err(Error::NotFound(format!(
            "Archive not found: {}",
            con.display()
        )));
    }

    let scratch = tempfile::TempDir::new()?;
    let extract_dir = scratch.path().join("extracted");
    std::fs::create_dir(&extract_dir)?;
    packer.extract(con, &extract_dir)?;

    let folders = song_folders(&extract_dir)?;
    if folders.is_empty() {
        warn!(archive = %con.display(), "No song folders found inside archive");
        return Ok(None);
    }

    let mut fixed = false;
    for folder in &folders {
        let Some(midi) = find_midi(folder)? else {
            debug!(folder = %folder.display(), "No MIDI file in song folder");
            continue;
        };
        if editor.shorten_note(&midi, track, location, SHORTEN_MS)? {
            info!(
                midi = %midi.display(),
                track,
                %location,
                shorten_ms = SHORTEN_MS,
                "Shortened vocal note"
            );
            fixed = true;
        }
    }

    if !fixed {
        warn!(
            track,
            %location,
            "No matching note found (already fixed, or wrong location/track?)"
        );
        return Ok(None);
    }

    let output = fixed_archive_path(con);
    packer.pack(&extract_dir, &output)?;
    info!(output = %output.display(), "Wrote fixed archive");
    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Packer that lays out song folders on extract and records pack calls
    struct FakePacker {
        folders: Vec<(&'static str, Option<&'static str>)>,
        packed: RefCell<Vec<PathBuf>>,
    }

    impl Packer for FakePacker {
        fn extract(&self, _archive: &Path, dir: &Path) -> Result<()> {
            for (folder, midi) in &self.folders {
                let folder = dir.join(folder);
                std::fs::create_dir(&folder)?;
                if let Some(midi) = midi {
                    std::fs::write(folder.join(midi), b"MThd")?;
                }
            }
            Ok(())
        }

        fn pack(&self, _dir: &Path, archive: &Path) -> Result<()> {
            self.packed.borrow_mut().push(archive.to_path_buf());
            Ok(())
        }
    }

    /// Editor that shortens a note only in files whose name contains `hit`
    struct FakeEditor {
        hit: &'static str,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl TimedTrackEditor for FakeEditor {
        fn shorten_note(
            &self,
            midi_path: &Path,
            track_marker: &str,
            _location: NoteLocation,
            shorten_ms: u32,
        ) -> Result<bool> {
            assert_eq!(shorten_ms, SHORTEN_MS);
            let name = midi_path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned();
            self.calls
                .borrow_mut()
                .push((name.clone(), track_marker.to_string()));
            Ok(name.contains(self.hit))
        }
    }

    fn archive(dir: &Path) -> PathBuf {
        let con = dir.join("MySong.con");
        std::fs::write(&con, b"CON").unwrap();
        con
    }

    #[test]
    fn test_location_parsing() {
        let location: NoteLocation = "49:4.300".parse().unwrap();
        assert_eq!(location.measure, 49);
        assert!((location.beat - 4.3).abs() < 1e-9);

        for bad in ["49", "x:1", "49:beat", "-1:2", "3:-1", ""] {
            assert!(
                matches!(bad.parse::<NoteLocation>(), Err(Error::InvalidInput(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_fixed_archive_name() {
        assert_eq!(
            fixed_archive_path(Path::new("/songs/MySong.con")),
            PathBuf::from("/songs/MySong_FIXED.con")
        );
    }

    #[test]
    fn test_fix_repacks_when_note_shortened() {
        let dir = tempfile::TempDir::new().unwrap();
        let con = archive(dir.path());
        let packer = FakePacker {
            folders: vec![("aaaa0001", Some("aaaa0001_hit.mid")), ("empty", None)],
            packed: RefCell::new(Vec::new()),
        };
        let editor = FakeEditor {
            hit: "hit",
            calls: RefCell::new(Vec::new()),
        };

        let output = fix_vocal_overhang(&con, "49:4.300", None, &packer, &editor).unwrap();
        let expected = dir.path().join("MySong_FIXED.con");
        assert_eq!(output, Some(expected.clone()));
        assert_eq!(*packer.packed.borrow(), vec![expected]);
        assert_eq!(
            *editor.calls.borrow(),
            vec![("aaaa0001_hit.mid".to_string(), DEFAULT_TRACK.to_string())]
        );
    }

    #[test]
    fn test_no_match_does_not_repack() {
        let dir = tempfile::TempDir::new().unwrap();
        let con = archive(dir.path());
        let packer = FakePacker {
            folders: vec![("song", Some("song.mid"))],
            packed: RefCell::new(Vec::new()),
        };
        let editor = FakeEditor {
            hit: "nothing",
            calls: RefCell::new(Vec::new()),
        };

        let output =
            fix_vocal_overhang(&con, "15:3.000", Some("PART HARM2"), &packer, &editor).unwrap();
        assert_eq!(output, None);
        assert!(packer.packed.borrow().is_empty());
        assert_eq!(editor.calls.borrow()[0].1, "PART HARM2");
    }

    #[test]
    fn test_invalid_location_fails_before_extracting() {
        let dir = tempfile::TempDir::new().unwrap();
        let con = archive(dir.path());
        let packer = FakePacker {
            folders: vec![("song", Some("song.mid"))],
            packed: RefCell::new(Vec::new()),
        };
        let editor = FakeEditor {
            hit: "song",
            calls: RefCell::new(Vec::new()),
        };

        let result = fix_vocal_overhang(&con, "not-a-location", None, &packer, &editor);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(editor.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_archive_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let packer = FakePacker {
            folders: Vec::new(),
            packed: RefCell::new(Vec::new()),
        };
        let editor = FakeEditor {
            hit: "x",
            calls: RefCell::new(Vec::new()),
        };
        let result =
            fix_vocal_overhang(&dir.path().join("missing.con"), "1:1", None, &packer, &editor);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

//! End-to-end runs: report generation and disabled-song extraction

use crate::catalog::{Catalog, Totals};
use crate::differ::diff;
use crate::dta::disabled::render_disabled_file;
use crate::dta::{extract_disabled, project, split_entries, ProjectionStats};
use crate::report::{FilterTerms, PreviousReport, ReportKind, ReportWriter};
use chrono::{DateTime, Utc};
use dta_common::time::format_report_timestamp;
use dta_common::{Error, ReportNames, Result, SonglistConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default file name for extracted disabled songs
pub const DISABLED_FILE_NAME: &str = "songs.disabled.dta";

/// Inputs of one report generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub report_names: ReportNames,
    pub filter: FilterTerms,
    pub generated_at: DateTime<Utc>,
}

impl GenerateOptions {
    /// Build options from loaded configuration
    pub fn from_config(
        input: PathBuf,
        output_dir: Option<&Path>,
        config: &SonglistConfig,
    ) -> Result<Self> {
        Ok(Self {
            input,
            output_dir: config.resolve_output_dir(output_dir)?,
            report_names: config.reports.clone(),
            filter: FilterTerms::from_settings(&config.filter)?,
            generated_at: dta_common::time::now(),
        })
    }
}

/// Per-report counts of a run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub file_name: String,
    pub kind: ReportKind,
    pub clean: bool,
    pub written: usize,
    pub filtered: usize,
    pub totals: Totals,
}

/// What a generation run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub entries: ProjectionStats,
    pub duplicates_dropped: usize,
    pub partials_promoted: usize,
    pub songs: usize,
    pub added: usize,
    pub removed: usize,
    pub previous_report_found: bool,
    pub previous_lines_skipped: usize,
    pub reports: Vec<ReportSummary>,
}

/// Read a text file, replacing invalid UTF-8
fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_previous_report(path: &Path) -> Result<Option<PreviousReport>> {
    if !path.exists() {
        info!(
            path = %path.display(),
            "No previous report found, every song counts as added"
        );
        return Ok(None);
    }

    let report = PreviousReport::parse(&read_lossy(path)?);
    if report.is_unrecognized() {
        warn!(
            path = %path.display(),
            skipped = report.skipped_lines(),
            "No line of the previous report could be parsed (format change?)"
        );
    } else if report.skipped_lines() > 0 {
        info!(
            parsed = report.parsed_lines(),
            skipped = report.skipped_lines(),
            "Skipped unparseable previous report lines"
        );
    }
    Ok(Some(report))
}

/// Parse the catalog, diff against the previous by-artist report and write
/// the four reports.
///
/// A missing input file fails before any output is touched.
pub fn generate(options: &GenerateOptions) -> Result<RunSummary> {
    if !options.input.is_file() {
        return Err(Error::NotFound(format!(
            "Input file not found: {}",
            options.input.display()
        )));
    }

    info!(input = %options.input.display(), "Reading song catalog");
    let text = read_lossy(&options.input)?;

    let projection = project(split_entries(&text));
    let stats = projection.stats;
    info!(
        entries = stats.total,
        completed = stats.completed,
        missing_artist = stats.missing_artist,
        missing_title = stats.missing_title,
        "Parsed catalog entries"
    );
    if stats.completed == 0 {
        warn!("No complete artist/title pairs found");
    }

    let catalog = Catalog::build(projection.records, projection.partials);
    info!(
        songs = catalog.len(),
        duplicates = catalog.duplicates_dropped(),
        partials = catalog.partials_promoted(),
        "Built song catalog"
    );

    let previous_path = options.output_dir.join(&options.report_names.by_artist);
    let previous = read_previous_report(&previous_path)?;
    let changes = diff(catalog.songs(), previous.as_ref());
    info!(
        added = changes.added.len(),
        removed = changes.removed.len(),
        "Compared with previous report"
    );

    let writer = ReportWriter::new(&options.filter, format_report_timestamp(options.generated_at));
    let reports = writer.render(catalog.songs(), &changes);
    reports.write_to(&options.output_dir, &options.report_names)?;

    let summary = RunSummary {
        input: options.input.clone(),
        output_dir: options.output_dir.clone(),
        entries: stats,
        duplicates_dropped: catalog.duplicates_dropped(),
        partials_promoted: catalog.partials_promoted(),
        songs: catalog.len(),
        added: changes.added.len(),
        removed: changes.removed.len(),
        previous_report_found: previous.is_some(),
        previous_lines_skipped: previous.as_ref().map_or(0, PreviousReport::skipped_lines),
        reports: reports
            .iter()
            .map(|report| ReportSummary {
                file_name: report.file_name(&options.report_names).to_string(),
                kind: report.kind,
                clean: report.clean,
                written: report.written,
                filtered: report.filtered,
                totals: report.totals,
            })
            .collect(),
    };

    info!(
        songs = summary.songs,
        added = summary.added,
        removed = summary.removed,
        "Song list generation complete"
    );
    Ok(summary)
}

/// What a disabled-song extraction did
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisabledSummary {
    pub disabled: usize,
    pub disabled_file: Option<PathBuf>,
    pub backup_file: Option<PathBuf>,
}

/// `<input>.backup`
pub fn backup_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Move commented-out songs from `input` into a separate file.
///
/// The backup is made once and never overwritten. Nothing is written when
/// no disabled songs are found.
pub fn extract_disabled_file(
    input: &Path,
    disabled_out: Option<&Path>,
    make_backup: bool,
) -> Result<DisabledSummary> {
    if !input.is_file() {
        return Err(Error::NotFound(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let text = read_lossy(input)?;
    let extraction = extract_disabled(&text);
    if extraction.disabled.is_empty() {
        info!(input = %input.display(), "No commented-out songs found");
        return Ok(DisabledSummary::default());
    }

    let mut summary = DisabledSummary {
        disabled: extraction.disabled.len(),
        ..Default::default()
    };

    if make_backup {
        let backup = backup_path(input);
        if backup.exists() {
            info!(path = %backup.display(), "Backup already exists, leaving it untouched");
        } else {
            std::fs::copy(input, &backup)?;
            info!(path = %backup.display(), "Created backup");
        }
        summary.backup_file = Some(backup);
    }

    let disabled_path = match disabled_out {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(DISABLED_FILE_NAME),
    };
    let source_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    std::fs::write(
        &disabled_path,
        render_disabled_file(&extraction.disabled, &source_name),
    )?;
    info!(
        path = %disabled_path.display(),
        songs = summary.disabled,
        "Wrote disabled songs"
    );

    std::fs::write(input, &extraction.active_text)?;
    info!(input = %input.display(), "Rewrote catalog without disabled songs");

    summary.disabled_file = Some(disabled_path);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/tmp/songs.dta")),
            PathBuf::from("/tmp/songs.dta.backup")
        );
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = GenerateOptions {
            input: dir.path().join("missing.dta"),
            output_dir: dir.path().to_path_buf(),
            report_names: ReportNames::default(),
            filter: FilterTerms::default(),
            generated_at: Utc::now(),
        };
        assert!(matches!(generate(&options), Err(Error::NotFound(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_extract_without_disabled_songs_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("songs.dta");
        std::fs::write(&input, "(a ('name' \"x\") ('artist' \"y\"))\n").unwrap();

        let summary = extract_disabled_file(&input, None, true).unwrap();
        assert_eq!(summary.disabled, 0);
        assert!(!backup_path(&input).exists());
        assert!(!dir.path().join(DISABLED_FILE_NAME).exists());
    }
}

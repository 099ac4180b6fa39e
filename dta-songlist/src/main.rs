//! dta-songlist - song list reports and catalog maintenance for DTA files
//!
//! Subcommands:
//! - `generate`: sorted song lists (full and clean) with changes since the last run
//! - `extract-disabled`: move commented-out songs into a separate file
//! - `fix-vocals`: shorten an overhanging harmony vocal note inside a CON archive

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dta_common::SonglistConfig;
use dta_songlist::packer::ExternalPacker;
use dta_songlist::vocal_fix::{fix_vocal_overhang, ExternalTrackEditor};
use dta_songlist::{extract_disabled_file, generate, GenerateOptions};

/// Command-line arguments for dta-songlist
#[derive(Parser, Debug)]
#[command(name = "dta-songlist")]
#[command(about = "Song list reports and maintenance tools for DTA song catalogs")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the four song list reports for a catalog
    Generate {
        /// Song catalog (songs.dta)
        input: PathBuf,

        /// Directory for the reports (also holds the previous run's reports)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Move commented-out songs into a separate file
    ExtractDisabled {
        /// Song catalog (songs.dta), rewritten in place
        input: PathBuf,

        /// Destination for disabled songs [default: songs.disabled.dta next to INPUT]
        #[arg(long)]
        disabled_out: Option<PathBuf>,

        /// Skip the one-time <INPUT>.backup copy
        #[arg(long)]
        no_backup: bool,
    },

    /// Shorten an overhanging vocal note in a CON archive
    FixVocals {
        /// Archive to fix
        con: PathBuf,

        /// Note position as MEASURE:BEAT, e.g. 49:4.300
        location: String,

        /// Track marker [default: PART HARM1]
        track: Option<String>,

        /// Timed-track editor program
        #[arg(long, env = "DTA_TRACK_EDITOR")]
        editor: String,
    },
}

fn init_tracing(verbose: bool, config_level: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_level.unwrap_or("info")))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = SonglistConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(args.verbose, config.log_level.as_deref());

    info!(
        "Starting dta-songlist v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match args.command {
        Commands::Generate {
            input,
            output_dir,
            json,
        } => {
            let options = GenerateOptions::from_config(input, output_dir.as_deref(), &config)
                .context("Invalid configuration")?;
            let summary = generate(&options).context("Song list generation failed")?;

            for report in &summary.reports {
                info!(
                    report = %report.file_name,
                    written = report.written,
                    filtered = report.filtered,
                    "Report summary"
                );
            }
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
                );
            }
        }

        Commands::ExtractDisabled {
            input,
            disabled_out,
            no_backup,
        } => {
            let summary = extract_disabled_file(&input, disabled_out.as_deref(), !no_backup)
                .context("Disabled song extraction failed")?;
            info!(disabled = summary.disabled, "Extraction complete");
        }

        Commands::FixVocals {
            con,
            location,
            track,
            editor,
        } => {
            let packer = ExternalPacker::from_settings(&config.packer);
            let editor = ExternalTrackEditor::new(editor);
            match fix_vocal_overhang(&con, &location, track.as_deref(), &packer, &editor)
                .context("Vocal fix failed")?
            {
                Some(output) => info!(output = %output.display(), "Fixed archive saved"),
                None => warn!("Nothing fixed, no archive written"),
            }
        }
    }

    Ok(())
}

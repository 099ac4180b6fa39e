//! Archive packing through an external tool

use dta_common::{Error, PackerSettings, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Extracts and builds console song archives
pub trait Packer {
    /// Extract `archive` into the existing directory `dir`
    fn extract(&self, archive: &Path, dir: &Path) -> Result<()>;

    /// Build `archive` from the contents of `dir`
    fn pack(&self, dir: &Path, archive: &Path) -> Result<()>;
}

/// Packer backed by a command-line program:
///
/// ```text
/// <program> extract <archive> <dir>
/// <program> pack <dir> <archive> --format <format>
/// ```
#[derive(Debug, Clone)]
pub struct ExternalPacker {
    program: String,
    format: String,
}

impl ExternalPacker {
    pub fn new(program: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format: format.into(),
        }
    }

    pub fn from_settings(settings: &PackerSettings) -> Self {
        Self::new(&settings.program, &settings.format)
    }

    fn run(&self, action: &str, args: &[&OsStr]) -> Result<()> {
        debug!(program = %self.program, action, ?args, "Running packer");

        let output = Command::new(&self.program)
            .arg(action)
            .args(args)
            .output()
            .map_err(|e| {
                Error::Packaging(format!("Failed to run '{}' {}: {}", self.program, action, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Packaging(format!(
                "'{}' {} exited with {}: {}",
                self.program,
                action,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Packer for ExternalPacker {
    fn extract(&self, archive: &Path, dir: &Path) -> Result<()> {
        info!(archive = %archive.display(), "Extracting archive");
        self.run("extract", &[archive.as_os_str(), dir.as_os_str()])
    }

    fn pack(&self, dir: &Path, archive: &Path) -> Result<()> {
        info!(archive = %archive.display(), format = %self.format, "Packing archive");
        self.run(
            "pack",
            &[
                dir.as_os_str(),
                archive.as_os_str(),
                OsStr::new("--format"),
                OsStr::new(&self.format),
            ],
        )
    }
}

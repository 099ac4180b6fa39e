//! Configuration loading and output folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DTA_SONGLIST_CONFIG";

/// Directory name used under the user config dir
const CONFIG_DIR_NAME: &str = "dta-songlist";

/// Song list tool configuration (all keys optional in TOML)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SonglistConfig {
    /// Directory the four reports are written to
    pub output_dir: Option<PathBuf>,
    /// Log level used when RUST_LOG is not set
    pub log_level: Option<String>,
    pub reports: ReportNames,
    pub filter: FilterSettings,
    pub packer: PackerSettings,
}

/// File names of the four generated reports
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportNames {
    pub by_artist: String,
    pub by_title: String,
    pub by_artist_clean: String,
    pub by_title_clean: String,
}

impl Default for ReportNames {
    fn default() -> Self {
        Self {
            by_artist: "SongListSortedByArtist.txt".to_string(),
            by_title: "SongListSortedBySongName.txt".to_string(),
            by_artist_clean: "SongListSortedByArtistClean.txt".to_string(),
            by_title_clean: "SongListSortedBySongNameClean.txt".to_string(),
        }
    }
}

/// Profanity filter terms layered over the built-in lists
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterSettings {
    /// Include the built-in word list and word-boundary patterns
    pub use_default_terms: bool,
    /// Extra literal terms (case-insensitive substring match)
    pub words: Vec<String>,
    /// Extra regular expressions (matched case-insensitively)
    pub patterns: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            use_default_terms: true,
            words: Vec::new(),
            patterns: Vec::new(),
        }
    }
}

/// External archive packer invocation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackerSettings {
    pub program: String,
    pub format: String,
}

impl Default for PackerSettings {
    fn default() -> Self {
        Self {
            program: "onyx".to_string(),
            format: "rb3-xbox".to_string(),
        }
    }
}

impl SonglistConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration following the resolution priority:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable
    /// 3. User config file
    /// 4. Compiled defaults (fallback)
    ///
    /// Files named explicitly (1 and 2) must exist; the user config file is optional.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_arg {
            tracing::debug!(path = %path.display(), "Loading config from command line");
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            tracing::debug!(path = %path.display(), "Loading config from {}", CONFIG_ENV_VAR);
            return Self::from_file(&path);
        }

        if let Some(path) = user_config_file() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading user config file");
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No config file found, using compiled defaults");
        Ok(Self::default())
    }

    /// Resolve the report output directory: CLI argument, then config, then cwd
    pub fn resolve_output_dir(&self, cli_arg: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_arg {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        Ok(std::env::current_dir()?)
    }
}

/// Platform config file location, e.g. ~/.config/dta-songlist/config.toml
fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SonglistConfig::from_toml_str("").unwrap();
        assert_eq!(config, SonglistConfig::default());
        assert!(config.filter.use_default_terms);
        assert_eq!(config.reports.by_artist, "SongListSortedByArtist.txt");
        assert_eq!(config.packer.program, "onyx");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = SonglistConfig::from_toml_str(
            r#"
            output_dir = "/tmp/lists"
            [reports]
            by_title = "ByTitle.txt"
            [filter]
            words = ["heck"]
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/lists")));
        assert_eq!(config.reports.by_title, "ByTitle.txt");
        assert_eq!(config.reports.by_artist, "SongListSortedByArtist.txt");
        assert_eq!(config.filter.words, vec!["heck".to_string()]);
        assert!(config.filter.use_default_terms);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = SonglistConfig::from_toml_str("output_dir = [");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_output_dir_priority() {
        let config = SonglistConfig {
            output_dir: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };

        let cli = PathBuf::from("/from/cli");
        assert_eq!(config.resolve_output_dir(Some(&cli)).unwrap(), cli);
        assert_eq!(
            config.resolve_output_dir(None).unwrap(),
            PathBuf::from("/from/config")
        );

        let defaults = SonglistConfig::default();
        assert_eq!(
            defaults.resolve_output_dir(None).unwrap(),
            std::env::current_dir().unwrap()
        );
    }
}

//! # DTA Common Library
//!
//! Shared code for the DTA song-list tools including:
//! - Error and result types
//! - Configuration loading and resolution
//! - Timestamp helpers
//! - Human-readable song length formatting

pub mod config;
pub mod error;
pub mod human_time;
pub mod time;

pub use config::{FilterSettings, PackerSettings, ReportNames, SonglistConfig};
pub use error::{Error, Result};

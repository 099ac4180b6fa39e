//! dta-songlist library interface
//!
//! Song list generation from DTA song catalogs, plus the catalog
//! maintenance tools exposed by the `dta-songlist` binary.

pub mod catalog;
pub mod differ;
pub mod dta;
pub mod normalize;
pub mod packer;
pub mod pipeline;
pub mod report;
pub mod vocal_fix;

pub use catalog::{Catalog, IdentityKey, PartialRecord, SongRecord, Totals};
pub use differ::{diff, diff_against_text, CatalogDiff};
pub use normalize::{to_comparison_key, to_display};
pub use pipeline::{
    extract_disabled_file, generate, DisabledSummary, GenerateOptions, ReportSummary, RunSummary,
};

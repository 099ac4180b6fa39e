//! DTA catalog parsing
//!
//! - [`scanner`]: top-level entry splitting
//! - [`extractor`]: direct-child field lookup
//! - [`projector`]: typed song records from entries
//! - [`disabled`]: commented-out entry extraction

pub mod disabled;
pub mod extractor;
pub mod projector;
pub mod scanner;

pub use disabled::{extract_disabled, DisabledExtraction, DisabledSong};
pub use extractor::{extract_field, EntryFields};
pub use projector::{project, Projection, ProjectionStats};
pub use scanner::{entry_spans, split_entries};

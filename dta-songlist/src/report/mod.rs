//! Song list reports
//!
//! - [`line`]: song line rendering
//! - [`reverse`]: recovering song identities from a previously written report
//! - [`filter`]: profanity filtering of rendered lines
//! - [`writer`]: header, sorting and the four report variants

pub mod filter;
pub mod line;
pub mod reverse;
pub mod writer;

pub use filter::FilterTerms;
pub use reverse::{parse_artist_line, PreviousReport, RecoveredSong};
pub use writer::{RenderedReport, ReportKind, ReportSet, ReportWriter};

/// First header line, followed by the generation timestamp
pub const GENERATED_LABEL: &str = "Generated:";
pub const ADDED_HEADING: &str = "New song counts added by artist:";
pub const REMOVED_HEADING: &str = "Songs removed by artist:";
pub const TOTAL_SONGS_LABEL: &str = "Total songs:";
pub const TOTAL_ALBUMS_LABEL: &str = "Total albums:";
pub const TOTAL_ARTISTS_LABEL: &str = "Total artists:";

/// Indent of `<artist>: <count>` lines under a heading
pub const COUNT_INDENT: &str = "  ";

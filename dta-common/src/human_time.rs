//! Human-readable song length formatting
//!
//! Song lengths in DTA files are stored in milliseconds. Reports show them
//! as `M:SS`, with minutes allowed to exceed 59 for very long tracks.

/// Placeholder shown for an unknown length or year
pub const UNKNOWN_PLACEHOLDER: &str = "?";

/// Format a length in milliseconds as `M:SS`.
///
/// Fractional seconds are truncated. Negative values (broken metadata) are
/// clamped to zero.
///
/// # Examples
///
/// ```
/// use dta_common::human_time::format_song_length;
///
/// assert_eq!(format_song_length(0), "0:00");
/// assert_eq!(format_song_length(215_999), "3:35");
/// assert_eq!(format_song_length(3_723_000), "62:03");
/// ```
pub fn format_song_length(millis: i64) -> String {
    let total_seconds = millis.max(0) / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Format an optional length, using `?` when unknown.
///
/// ```
/// use dta_common::human_time::format_song_length_opt;
///
/// assert_eq!(format_song_length_opt(Some(61_000)), "1:01");
/// assert_eq!(format_song_length_opt(None), "?");
/// ```
pub fn format_song_length_opt(millis: Option<i64>) -> String {
    match millis {
        Some(ms) => format_song_length(ms),
        None => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

//! Direct-child field extraction
//!
//! Each entry is scanned once into a shallow list of `(key, value)` pairs
//! taken from the lists nested exactly one level below the entry root, plus
//! the entry's identifier (the first token after the opening parenthesis).
//! Lookups then never match a key that only appears deeper, such as the
//! `name` inside a nested `(song (name "songs/x/x"))` block.

use super::scanner::{closing_double_quote, skip_comment, skip_double_quoted, skip_single_quoted};
use crate::normalize::unescape;

/// Direct children of one entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields<'a> {
    identifier: Option<String>,
    fields: Vec<(&'a str, Option<String>)>,
}

impl<'a> EntryFields<'a> {
    /// Scan an entry's text (as produced by the entry splitter)
    pub fn parse(entry: &'a str) -> Self {
        let bytes = entry.as_bytes();
        let mut depth: usize = 0;
        let mut identifier = None;
        let mut fields = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    i = skip_double_quoted(bytes, i);
                    continue;
                }
                b'\'' => {
                    i = skip_single_quoted(bytes, i);
                    continue;
                }
                b';' => {
                    i = skip_comment(bytes, i);
                    continue;
                }
                b'(' => {
                    depth += 1;
                    if depth == 1 && identifier.is_none() {
                        identifier = read_token(entry, skip_blank(bytes, i + 1));
                    } else if depth == 2 {
                        if let Some(field) = read_child(entry, i + 1) {
                            fields.push(field);
                        }
                    }
                }
                b')' => {
                    if depth <= 1 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            i += 1;
        }

        Self { identifier, fields }
    }

    /// The entry's declared unique key
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Value of the first direct child list headed by `key`.
    ///
    /// `None` when no direct child has that key, or when the first one
    /// found carries no readable value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// First non-empty value among alternate keys, tried in order
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.trim().is_empty())
    }

    /// Keys of all direct children, in source order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }
}

/// Look up a single direct-child field of an entry
pub fn extract_field(entry: &str, key: &str) -> Option<String> {
    EntryFields::parse(entry).get(key).map(str::to_string)
}

/// Skip whitespace and `;` comments
fn skip_blank(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b';' => i = skip_comment(bytes, i),
            b if b.is_ascii_whitespace() => i += 1,
            _ => break,
        }
    }
    i
}

fn is_bare_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'"' | b'\'' | b';')
}

/// Read the head of a child list opening just before `start`.
///
/// The head may be single-quoted (`('name' ...)`). It must be followed by
/// whitespace, `)`, `"` or `'`; anything else is not a key.
fn read_child<'a>(entry: &'a str, start: usize) -> Option<(&'a str, Option<String>)> {
    let bytes = entry.as_bytes();
    let head_start = skip_blank(bytes, start);
    if head_start >= bytes.len() {
        return None;
    }

    let (key, after) = if bytes[head_start] == b'\'' {
        let close = bytes[head_start + 1..].iter().position(|&b| b == b'\'')?;
        let close = head_start + 1 + close;
        (&entry[head_start + 1..close], close + 1)
    } else {
        let end = bytes[head_start..]
            .iter()
            .position(|&b| is_bare_terminator(b))
            .map_or(bytes.len(), |offset| head_start + offset);
        (&entry[head_start..end], end)
    };

    if key.is_empty() {
        return None;
    }
    match bytes.get(after) {
        None => Some((key, None)),
        Some(&b) if b.is_ascii_whitespace() || matches!(b, b')' | b'"' | b'\'' | b';') => {
            Some((key, read_value(entry, after)))
        }
        Some(_) => None,
    }
}

/// Read the value following a matched key
fn read_value(entry: &str, start: usize) -> Option<String> {
    let bytes = entry.as_bytes();
    let i = skip_blank(bytes, start);
    match bytes.get(i)? {
        b'"' => {
            let close = closing_double_quote(bytes, i)?;
            Some(unescape(&entry[i + 1..close]).into_owned())
        }
        b'\'' => {
            let close = bytes[i + 1..].iter().position(|&b| b == b'\'')?;
            Some(entry[i + 1..i + 1 + close].to_string())
        }
        b'(' | b')' => None,
        _ => {
            let end = bytes[i..]
                .iter()
                .position(|&b| b.is_ascii_whitespace() || b == b')')
                .map_or(bytes.len(), |offset| i + offset);
            Some(entry[i..end].to_string())
        }
    }
}

/// Read the first atom, string or quoted atom at `start`
fn read_token(entry: &str, start: usize) -> Option<String> {
    let bytes = entry.as_bytes();
    match bytes.get(start)? {
        b'(' | b')' => None,
        b'"' | b'\'' => read_value(entry, start),
        _ => {
            let end = bytes[start..]
                .iter()
                .position(|&b| is_bare_terminator(b))
                .map_or(bytes.len(), |offset| start + offset);
            Some(entry[start..end].to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_and_bare_values() {
        let entry = r#"(song1 (name "Test Song") (artist "Test Artist") (year_released 1995))"#;
        let fields = EntryFields::parse(entry);
        assert_eq!(fields.get("name"), Some("Test Song"));
        assert_eq!(fields.get("artist"), Some("Test Artist"));
        assert_eq!(fields.get("year_released"), Some("1995"));
        assert_eq!(fields.identifier(), Some("song1"));
    }

    #[test]
    fn test_nested_key_does_not_match() {
        let entry = r#"(song1 (song (name "songs/song1/song1")) (artist "A"))"#;
        assert_eq!(extract_field(entry, "name"), None);
        assert_eq!(extract_field(entry, "artist"), Some("A".to_string()));
    }

    #[test]
    fn test_direct_child_after_nested_block() {
        let entry = r#"(s (song (name "songs/s/s") (tracks ((drum (0 1))))) (name "Real Title"))"#;
        assert_eq!(extract_field(entry, "name"), Some("Real Title".to_string()));
    }

    #[test]
    fn test_single_quoted_head_and_multiline_layout() {
        let entry = "(\n   'song2'\n   (\n      'name'\n      \"Quoted Head\"\n   )\n   ('artist' 'Atom Artist')\n)";
        let fields = EntryFields::parse(entry);
        assert_eq!(fields.identifier(), Some("song2"));
        assert_eq!(fields.get("name"), Some("Quoted Head"));
        assert_eq!(fields.get("artist"), Some("Atom Artist"));
    }

    #[test]
    fn test_partial_token_not_matched() {
        let entry = r#"(s (namespace "wrong") (name_alt "also wrong"))"#;
        assert_eq!(extract_field(entry, "name"), None);
        assert_eq!(extract_field(entry, "namespace"), Some("wrong".to_string()));
    }

    #[test]
    fn test_head_followed_by_paren_is_not_key() {
        let entry = r#"(s (name(x) "v"))"#;
        assert_eq!(extract_field(entry, "name"), None);
    }

    #[test]
    fn test_escapes_decoded() {
        let entry = r#"(s (name "The \qBest\q \"Song\""))"#;
        assert_eq!(
            extract_field(entry, "name"),
            Some("The \"Best\" \"Song\"".to_string())
        );
    }

    #[test]
    fn test_missing_or_unreadable_value() {
        assert_eq!(extract_field("(s (name))", "name"), None);
        assert_eq!(extract_field("(s (name (nested list)))", "name"), None);
        assert_eq!(extract_field(r#"(s (name "unterminated"#, "name"), None);
        assert_eq!(extract_field("(s (artist \"A\"))", "name"), None);
    }

    #[test]
    fn test_empty_string_value() {
        assert_eq!(extract_field(r#"(s (name ""))"#, "name"), Some(String::new()));
    }

    #[test]
    fn test_first_match_wins() {
        let entry = r#"(s (name "First") (name "Second"))"#;
        assert_eq!(extract_field(entry, "name"), Some("First".to_string()));
    }

    #[test]
    fn test_first_of_skips_blank_values() {
        let entry = r#"(s (songname "  ") (title "Fallback"))"#;
        let fields = EntryFields::parse(entry);
        assert_eq!(fields.first_of(&["songname", "song_name", "title"]), Some("Fallback"));
    }

    #[test]
    fn test_comment_inside_entry_ignored() {
        let entry = "(s ; (name \"Commented\")\n (name \"Live\"))";
        assert_eq!(extract_field(entry, "name"), Some("Live".to_string()));
    }

    #[test]
    fn test_identifier_variants() {
        assert_eq!(EntryFields::parse(r#"("quoted id" (a 1))"#).identifier(), Some("quoted id"));
        assert_eq!(EntryFields::parse("((a 1))").identifier(), None);
        assert_eq!(EntryFields::parse("( ; c\n id2 (a 1))").identifier(), Some("id2"));
    }

    #[test]
    fn test_keys_in_order() {
        let fields = EntryFields::parse("(s (a 1) (b (c 2)) ('d' 3))");
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "b", "d"]);
    }
}

//! Profanity filter for the "clean" report variants
//!
//! Applied per rendered line: a line is excluded when it contains any
//! literal term (case-insensitive substring) or matches any word-boundary
//! pattern. Short words that occur inside innocent words ("ass" in
//! "classical") belong in the pattern list, not the literal list.

use dta_common::config::FilterSettings;
use dta_common::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Built-in literal terms (matched as substrings)
pub const DEFAULT_WORDS: &[&str] = &[
    "fuck", "shit", "bitch", "damn", "asshole", "bastard", "cunt", "whore", "slut", "piss",
];

/// Built-in word-boundary patterns
pub const DEFAULT_PATTERNS: &[&str] = &[
    r"\bass\b",
    r"\bhell\b",
    r"\bdick\b",
    r"\bcock\b",
    r"\btits?\b",
    r"\bcum\b",
];

/// Literal terms plus compiled patterns
#[derive(Debug, Clone, Default)]
pub struct FilterTerms {
    words: Vec<String>,
    patterns: Vec<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Config(format!("Invalid filter pattern '{}': {}", pattern, e)))
}

impl FilterTerms {
    /// Build from literal terms and pattern sources
    pub fn new<W, P>(words: W, patterns: P) -> Result<Self>
    where
        W: IntoIterator,
        W::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let patterns = patterns
            .into_iter()
            .map(|p| compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { words, patterns })
    }

    /// The built-in lists only
    pub fn default_terms() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            patterns: DEFAULT_PATTERNS
                .iter()
                .filter_map(|p| compile(p).ok())
                .collect(),
        }
    }

    /// Built-in lists (unless disabled) plus configured extras
    pub fn from_settings(settings: &FilterSettings) -> Result<Self> {
        let mut terms = if settings.use_default_terms {
            Self::default_terms()
        } else {
            Self::default()
        };
        let extra = Self::new(&settings.words, &settings.patterns)?;
        terms.words.extend(extra.words);
        terms.patterns.extend(extra.patterns);
        Ok(terms)
    }

    /// True when the line must be left out of a clean report
    pub fn is_profane(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.words.iter().any(|w| lowered.contains(w.as_str()))
            || self.patterns.iter().any(|p| p.is_match(line))
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.patterns.is_empty()
    }
}

// src/extract/keywords.rs
// =============================================================================
// Keyword handling.
//
// Keywords are plain, case-sensitive substrings. "Admin" does not match
// "admin", and a keyword matches anywhere in the raw page text, markup
// included.
// =============================================================================

use std::fmt;

/// Ordered, duplicate-free list of keywords for one walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Builds a set from individual keywords.
    /// Blank entries are dropped and later duplicates are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if !keyword.is_empty() && !set.keywords.iter().any(|k| k == keyword) {
                set.keywords.push(keyword.to_string());
            }
        }
        set
    }

    /// Parses user input like "login, admin ,password"
    pub fn parse(input: &str) -> Self {
        Self::new(input.split(','))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords.join(", "))
    }
}

// Returns the keywords that appear in `content`, in keyword order
pub fn find_keywords<'k>(content: &str, keywords: &'k KeywordSet) -> Vec<&'k str> {
    keywords.iter().filter(|keyword| content.contains(*keyword)).collect()
}

//! Keyword tokenizing with simple plural folding.

use std::collections::BTreeSet;

/// A lowercase search token and, for plural-looking tokens, its singular.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token {
    text: String,
    singular: Option<String>,
}

impl Token {
    /// Creates a token from a single word, lowercasing it.
    #[must_use]
    pub fn new(word: &str) -> Self {
        let text = word.to_lowercase();
        let singular = singularize(&text).map(str::to_string);
        Self { text, singular }
    }

    /// The lowercase token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the token, or its singular form, occurs in `haystack`.
    ///
    /// `haystack` must already be lowercase.
    #[must_use]
    pub fn is_found_in(&self, haystack: &str) -> bool {
        haystack.contains(&self.text)
            || self
                .singular
                .as_deref()
                .is_some_and(|singular| haystack.contains(singular))
    }
}

/// Splits a keyword string on runs of whitespace into distinct tokens.
///
/// Empty input yields an empty set.
#[must_use]
pub fn tokenize(keyword: &str) -> BTreeSet<Token> {
    keyword.split_whitespace().map(Token::new).collect()
}

/// Strips a trailing `s` from words longer than three characters.
///
/// "cables" becomes "cable"; "bus" and "gas" are left alone.
#[must_use]
pub fn singularize(word: &str) -> Option<&str> {
    if word.chars().count() > 3 {
        word.strip_suffix('s')
    } else {
        None
    }
}

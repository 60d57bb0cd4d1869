use once_cell::sync::Lazy;
use regex::Regex;

// Runs of two or more Unicode word characters; single letters and punctuation drop out.
static TERM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("term pattern is a valid regex"));

/// Splits text into normalized terms.
///
/// Training phrases and queries must go through the same tokenizer, so the
/// matcher owns exactly one and uses it for both.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Unicode case-fold. Diacritics are kept.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
    }

    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);
        TERM_PATTERN
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

use std::path::Path;

use newscheck_common::{NewsCheckError, Result};
use serde::Deserialize;

/// Clickbait and sensational vocabulary. Matched case-insensitively on word
/// boundaries, so "he secretly" does not fire inside "she secretly".
pub const DEFAULT_SENSATIONAL_TERMS: &[&str] = &[
    "shocking",
    "unbelievable",
    "you won't believe",
    "this will shock you",
    "celebrities hate",
    "doctors hate",
    "government doesn't want you to know",
    "one weird trick",
    "number 7 will blow your mind",
    "he did what?!",
    "she secretly",
    "he secretly",
    "this is why",
    "the truth about",
    "mind-blowing",
    "jaw-dropping",
    "bombshell",
    "outrageous",
    "miracle",
    "exposed",
    "goes viral",
];

/// Clickbait templates. Compiled case-insensitively.
pub const DEFAULT_SUSPICIOUS_PATTERNS: &[&str] = &[
    r"you won'?t believe",
    r"what happens next",
    r"what (?:this|that|these|those|he|she|they) \w+ (?:did|does|said|found)",
    r"(?:will|is going to) (?:shock|amaze|surprise|blow) you",
    r"doctors? (?:hate|don'?t want)",
    r"one (?:weird|simple|strange) trick",
    r"(?:they|the government) (?:don'?t|doesn'?t) want you to know",
    r"number \d+ will",
    r"sponsored content",
    r"the truth about",
    r"miracle (?:cure|pill|diet)",
    r"before (?:it'?s|it is) (?:too late|deleted|banned)",
];

/// Lexicon data for the heuristic scorer. A TOML file may override either
/// list; a missing list keeps the built-in one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lexicon {
    pub sensational_terms: Vec<String>,
    pub suspicious_patterns: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            sensational_terms: DEFAULT_SENSATIONAL_TERMS.iter().map(|s| s.to_string()).collect(),
            suspicious_patterns: DEFAULT_SUSPICIOUS_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Lexicon {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NewsCheckError::Lexicon(e.to_string()))
    }

    /// Load and parse a TOML lexicon file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NewsCheckError::Lexicon(format!("Failed to read lexicon file {}: {e}", path.display()))
        })?;
        let lexicon: Self = toml::from_str(&content).map_err(|e| {
            NewsCheckError::Lexicon(format!("Failed to parse lexicon file {}: {e}", path.display()))
        })?;
        tracing::info!(
            path = %path.display(),
            terms = lexicon.sensational_terms.len(),
            patterns = lexicon.suspicious_patterns.len(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_builtin_patterns() {
        let lexicon = Lexicon::from_toml_str(r#"sensational_terms = ["astonishing"]"#).unwrap();
        assert_eq!(lexicon.sensational_terms, vec!["astonishing"]);
        assert_eq!(
            lexicon.suspicious_patterns.len(),
            DEFAULT_SUSPICIOUS_PATTERNS.len()
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Lexicon::from_toml_str(r#"weights = [1.0]"#).unwrap_err();
        assert!(matches!(err, NewsCheckError::Lexicon(_)));
    }

    #[test]
    fn missing_file_is_a_lexicon_error() {
        let err = Lexicon::load(Path::new("/nonexistent/lexicon.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read lexicon file"));
    }
}

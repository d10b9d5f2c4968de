// Rule-based scorer: five independent signals, each in [0,1], combined by a
// fixed weighted sum. Pure function of the text.

use std::collections::BTreeMap;

use newscheck_common::{Details, Mode, NewsCheckError, Result, ScoreResult, Signal, SignalBreakdown};
use regex::{Regex, RegexBuilder};

use crate::lexicon::Lexicon;

// Signal weights. They sum to 1.0.
pub const SENSATIONAL_WEIGHT: f64 = 0.35;
pub const PUNCTUATION_WEIGHT: f64 = 0.25;
pub const CAPS_WEIGHT: f64 = 0.06;
pub const PATTERN_WEIGHT: f64 = 0.30;
pub const LENGTH_WEIGHT: f64 = 0.04;

/// One lexicon hit per this many words saturates the sensational signal.
const SENSATIONAL_DENSITY_SCALE: f64 = 10.0;
/// Added per extra mark in a run of consecutive `!`/`?`.
const PUNCTUATION_RUN_STEP: f64 = 0.5;
/// Uppercase share of letters at or below which caps scores zero.
pub const CAPS_THRESHOLD: f64 = 0.30;
/// Added per matching clickbait template.
const PATTERN_STEP: f64 = 0.5;
pub const MIN_WORDS: usize = 5;
pub const MAX_WORDS: usize = 500;

pub const SENSATIONAL_WORDS: &str = "sensational_words";
pub const PUNCTUATION_ABUSE: &str = "punctuation_abuse";
pub const CAPS_RATIO: &str = "caps_ratio";
pub const SUSPICIOUS_PATTERNS: &str = "suspicious_patterns";
pub const LENGTH_ANOMALY: &str = "length_anomaly";

#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    terms: Vec<String>,
    patterns: Vec<Regex>,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new(&Lexicon::default()).expect("built-in lexicon patterns are valid")
    }
}

impl HeuristicScorer {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let terms = lexicon
            .sensational_terms
            .iter()
            .map(|t| fold_apostrophes(&t.trim().to_lowercase()))
            .filter(|t| !t.is_empty())
            .collect();

        let patterns = lexicon
            .suspicious_patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| NewsCheckError::Lexicon(format!("invalid pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { terms, patterns })
    }

    /// Score text in [0,1] with its signal breakdown. Blank text scores 0
    /// and is flagged `empty_input`.
    pub fn score(&self, text: &str) -> (f64, SignalBreakdown) {
        if text.trim().is_empty() {
            return (0.0, SignalBreakdown::empty_input());
        }

        let text = fold_apostrophes(text);
        let lower = text.to_lowercase();
        let words = text.split_whitespace().count();

        let mut signals = BTreeMap::new();
        signals.insert(SENSATIONAL_WORDS.to_string(), self.sensational(&lower, words));
        signals.insert(PUNCTUATION_ABUSE.to_string(), punctuation(&text, words));
        signals.insert(CAPS_RATIO.to_string(), caps(&text));
        signals.insert(SUSPICIOUS_PATTERNS.to_string(), self.suspicious(&text));
        signals.insert(LENGTH_ANOMALY.to_string(), length(words));

        let score: f64 = signals.values().map(Signal::contribution).sum();
        (
            score.clamp(0.0, 1.0),
            SignalBreakdown {
                signals,
                empty_input: false,
            },
        )
    }

    /// Rule-based result: confidence is the distance from the 0.5 midpoint,
    /// scaled to [0,1].
    pub fn predict(&self, text: &str) -> ScoreResult {
        if text.trim().is_empty() {
            return ScoreResult::empty_input(Mode::RuleBased);
        }
        let (score, breakdown) = self.score(text);
        ScoreResult::new(
            score,
            rule_confidence(score),
            Mode::RuleBased,
            Details::RuleBased(breakdown),
        )
    }

    fn sensational(&self, lower: &str, words: usize) -> Signal {
        let mut hits = Vec::new();
        let mut count = 0;
        for term in &self.terms {
            let n = count_term(lower, term);
            if n > 0 {
                count += n;
                hits.push(term.as_str());
            }
        }

        let value = (count as f64 / words.max(1) as f64 * SENSATIONAL_DENSITY_SCALE).min(1.0);
        let explanation = if hits.is_empty() {
            "no sensational vocabulary".to_string()
        } else {
            format!("{count} sensational term(s): {}", hits.join(", "))
        };
        Signal {
            value,
            weight: SENSATIONAL_WEIGHT,
            explanation,
        }
    }

    fn suspicious(&self, text: &str) -> Signal {
        let matched: Vec<&str> = self
            .patterns
            .iter()
            .filter(|re| re.is_match(text))
            .map(|re| re.as_str())
            .collect();

        let value = (matched.len() as f64 * PATTERN_STEP).min(1.0);
        let explanation = if matched.is_empty() {
            "no clickbait templates".to_string()
        } else {
            format!("{} clickbait template(s) matched", matched.len())
        };
        Signal {
            value,
            weight: PATTERN_WEIGHT,
            explanation,
        }
    }
}

pub fn rule_confidence(score: f64) -> f64 {
    ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

fn fold_apostrophes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}

/// Occurrences of `term` in `haystack` not embedded in a longer word.
fn count_term(haystack: &str, term: &str) -> usize {
    let is_word = |c: char| c.is_alphanumeric();
    haystack
        .match_indices(term)
        .filter(|(start, matched)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + matched.len()..].chars().next();
            !before.is_some_and(is_word) && !after.is_some_and(is_word)
        })
        .count()
}

fn punctuation(text: &str, words: usize) -> Signal {
    let mut marks = 0usize;
    let mut run = 0usize;
    let mut runs = Vec::new();
    for c in text.chars() {
        if c == '!' || c == '?' {
            marks += 1;
            run += 1;
        } else {
            if run > 1 {
                runs.push(run);
            }
            run = 0;
        }
    }
    if run > 1 {
        runs.push(run);
    }

    let run_score: f64 = runs.iter().map(|r| (r - 1) as f64 * PUNCTUATION_RUN_STEP).sum();
    let density = marks as f64 / words.max(1) as f64;
    let value = (run_score + density).min(1.0);

    let explanation = if marks == 0 {
        "no exclamation or question marks".to_string()
    } else {
        format!(
            "{marks} !/? mark(s), {} repeated run(s)",
            runs.len()
        )
    };
    Signal {
        value,
        weight: PUNCTUATION_WEIGHT,
        explanation,
    }
}

fn caps(text: &str) -> Signal {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    let ratio = if letters == 0 {
        0.0
    } else {
        upper as f64 / letters as f64
    };

    let value = if ratio <= CAPS_THRESHOLD {
        0.0
    } else {
        ((ratio - CAPS_THRESHOLD) / (1.0 - CAPS_THRESHOLD)).min(1.0)
    };
    Signal {
        value,
        weight: CAPS_WEIGHT,
        explanation: format!("{:.0}% of letters uppercase", ratio * 100.0),
    }
}

fn length(words: usize) -> Signal {
    let (value, explanation) = if words < MIN_WORDS {
        (
            (MIN_WORDS - words) as f64 / MIN_WORDS as f64,
            format!("very short ({words} words)"),
        )
    } else if words > MAX_WORDS {
        (
            ((words - MAX_WORDS) as f64 / MAX_WORDS as f64).min(1.0),
            format!("very long ({words} words)"),
        )
    } else {
        (0.0, format!("normal length ({words} words)"))
    };
    Signal {
        value,
        weight: LENGTH_WEIGHT,
        explanation,
    }
}

//! Windowed sentiment heuristic for allergen mentions.

use serde::{Deserialize, Serialize};

use crate::lexicon::CueSets;
use crate::phrase_matcher::PhraseMatch;
use crate::token::Token;

/// Tokens inspected on each side of an allergen span.
pub const CONTEXT_RADIUS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the sentiment expressed around `span`.
///
/// The window is the span widened by [`CONTEXT_RADIUS`] tokens on both sides
/// and clipped to the document. Negation (a `neg` dependency or a negative
/// cue lemma) beats a positive cue lemma; no cue at all is neutral.
pub fn classify(tokens: &[Token], span: &PhraseMatch, cues: &CueSets) -> SentimentLabel {
    let from = span.start.saturating_sub(CONTEXT_RADIUS);
    let to = (span.end + CONTEXT_RADIUS).min(tokens.len());
    let window = tokens.get(from..to).unwrap_or(&[]);

    let negated = window
        .iter()
        .any(|t| t.is_neg() || cues.is_negative(&t.lemma));
    if negated {
        return SentimentLabel::Negative;
    }

    if window.iter().any(|t| cues.is_positive(&t.lemma)) {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}

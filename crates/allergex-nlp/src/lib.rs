//! Species / allergen association engine.
//!
//! Finds lexicon species and allergen phrases in annotated text, classifies
//! the sentiment around each allergen, and pairs every distinct allergen with
//! the nearest species mention that precedes it.

pub mod annotator;
pub mod association;
pub mod engine;
pub mod lexicon;
pub mod phrase_matcher;
pub mod sentiment;
pub mod token;

pub use annotator::{Annotator, HttpAnnotator, RuleAnnotator};
pub use association::{associate, AllergenSentiments};
pub use engine::{Engine, ResultRecord};
pub use lexicon::Lexicon;
pub use phrase_matcher::{PhraseMatch, PhraseMatcher};
pub use sentiment::{classify, SentimentLabel, CONTEXT_RADIUS};
pub use token::Token;

pub type Result<T> = std::result::Result<T, NlpError>;

/// Engine errors.
///
/// `Annotator` and `InvalidTokens` are the per-request processing errors: they
/// fail one `fit` call and leave the engine usable. `MatcherBuild` only occurs
/// while constructing an engine.
#[derive(Debug, thiserror::Error)]
pub enum NlpError {
    #[error("Annotator failed: {0}")]
    Annotator(String),

    #[error("Invalid token stream: {0}")]
    InvalidTokens(String),

    #[error("Matcher build failed: {0}")]
    MatcherBuild(String),
}

impl NlpError {
    /// True for failures scoped to a single `fit` call.
    pub fn is_processing(&self) -> bool {
        matches!(self, NlpError::Annotator(_) | NlpError::InvalidTokens(_))
    }
}

impl From<reqwest::Error> for NlpError {
    fn from(e: reqwest::Error) -> Self {
        NlpError::Annotator(e.to_string())
    }
}

impl From<aho_corasick::BuildError> for NlpError {
    fn from(e: aho_corasick::BuildError) -> Self {
        NlpError::MatcherBuild(e.to_string())
    }
}

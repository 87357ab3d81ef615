//! The extraction engine: annotate, match, classify, associate.
//!
//! An [`Engine`] is built once from a [`Lexicon`] and an [`Annotator`]. The
//! phrase lists are compiled at construction and the engine is immutable
//! afterwards, so a single instance can be shared across tasks behind an
//! `Arc` without locking.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::annotator::Annotator;
use crate::association::{associate, AllergenSentiments};
use crate::lexicon::{CueSets, Lexicon};
use crate::phrase_matcher::{PhraseMatch, PhraseMatcher};
use crate::sentiment::{classify, SentimentLabel};
use crate::token::{self, CharIndex, Token};
use crate::Result;

/// One species/allergen association with positions in the input text.
///
/// Offsets are character offsets, start inclusive and end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub species_name: String,
    pub allergen_phrase: String,
    pub sentiment: SentimentLabel,
    pub species_char_start: usize,
    pub species_char_end: usize,
    pub allergen_char_start: usize,
    pub allergen_char_end: usize,
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Species: {}, Allergen: {}, Sentiment: {}, Species position: ({}, {}), Allergen position: ({}, {})",
            self.species_name,
            self.allergen_phrase,
            self.sentiment,
            self.species_char_start,
            self.species_char_end,
            self.allergen_char_start,
            self.allergen_char_end,
        )
    }
}

pub struct Engine {
    lexicon: Lexicon,
    cues: CueSets,
    species: PhraseMatcher,
    allergens: PhraseMatcher,
    annotator: Arc<dyn Annotator>,
}

impl Engine {
    /// Compile the lexicon's phrase lists with `annotator`'s tokenization.
    pub async fn new(lexicon: Lexicon, annotator: Arc<dyn Annotator>) -> Result<Self> {
        let start = Instant::now();
        let species = PhraseMatcher::compile(&lexicon.species, annotator.as_ref()).await?;
        let allergens = PhraseMatcher::compile(&lexicon.allergens, annotator.as_ref()).await?;
        let cues = lexicon.cues();

        info!(
            species = species.stats().phrase_count,
            allergens = allergens.stats().phrase_count,
            positive = cues.positive.len(),
            negative = cues.negative.len(),
            "Engine ready in {:?}",
            start.elapsed()
        );

        Ok(Self {
            lexicon,
            cues,
            species,
            allergens,
            annotator,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Annotate `text` and extract its species/allergen records.
    pub async fn fit(&self, text: &str) -> Result<Vec<ResultRecord>> {
        debug!(text_len = text.len(), "Fitting text");
        let tokens = self.annotator.annotate(text).await?;
        self.fit_tokens(text, &tokens)
    }

    /// Extract records from an already annotated `text`.
    ///
    /// Fails with [`crate::NlpError::InvalidTokens`] when the tokens do not
    /// line up with `text`.
    pub fn fit_tokens(&self, text: &str, tokens: &[Token]) -> Result<Vec<ResultRecord>> {
        let index = CharIndex::new(text);
        token::validate_indexed(&index, tokens)?;

        let species_matches = self.species.find_indexed(&index, tokens);
        let allergen_matches = self.allergens.find_indexed(&index, tokens);

        let sentiments = self.allergen_sentiments(tokens, &allergen_matches);
        let records = associate(&species_matches, &allergen_matches, &sentiments);

        debug!(
            tokens = tokens.len(),
            species = species_matches.len(),
            allergens = allergen_matches.len(),
            records = records.len(),
            "Fit complete"
        );
        Ok(records)
    }

    fn allergen_sentiments(&self, tokens: &[Token], matches: &[PhraseMatch]) -> AllergenSentiments {
        let mut sentiments = AllergenSentiments::new();
        for span in matches {
            sentiments.record(&span.text, classify(tokens, span, &self.cues));
        }
        sentiments
    }
}

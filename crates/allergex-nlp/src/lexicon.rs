//! The four word/phrase lists the engine is built from.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Species, allergen and sentiment-cue lists.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub species: Vec<String>,
    pub allergens: Vec<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Lexicon {
    pub fn new(
        species: Vec<String>,
        allergens: Vec<String>,
        positive: Vec<String>,
        negative: Vec<String>,
    ) -> Self {
        Self {
            species,
            allergens,
            positive,
            negative,
        }
    }

    pub(crate) fn cues(&self) -> CueSets {
        CueSets {
            positive: fold(&self.positive),
            negative: fold(&self.negative),
        }
    }
}

/// Case-folded cue lookups used by the sentiment classifier.
#[derive(Debug, Clone, Default)]
pub struct CueSets {
    pub positive: AHashSet<String>,
    pub negative: AHashSet<String>,
}

impl CueSets {
    pub fn is_positive(&self, lemma: &str) -> bool {
        self.positive.contains(&lemma.to_lowercase())
    }

    pub fn is_negative(&self, lemma: &str) -> bool {
        self.negative.contains(&lemma.to_lowercase())
    }
}

fn fold(words: &[String]) -> AHashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}

//! Pairing allergen mentions with the nearest preceding species mention.

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::engine::ResultRecord;
use crate::phrase_matcher::PhraseMatch;
use crate::sentiment::SentimentLabel;

/// Sentiment per distinct (lowercased) allergen text.
///
/// Recording the same text twice keeps its first-seen position but replaces
/// the label, so the last processed occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct AllergenSentiments {
    entries: Vec<(String, SentimentLabel)>,
    index: AHashMap<String, usize>,
}

impl AllergenSentiments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, allergen: &str, label: SentimentLabel) {
        let key = allergen.to_lowercase();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = label,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, label));
            }
        }
    }

    pub fn get(&self, allergen: &str) -> Option<SentimentLabel> {
        self.index
            .get(&allergen.to_lowercase())
            .map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SentimentLabel)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build one record per distinct allergen text that has a species mention
/// ending before it.
///
/// End offsets are exclusive, so a species whose end equals the allergen start
/// precedes it: its last token begins before the allergen does.
///
/// The allergen position is its first occurrence among `allergen_matches`.
/// Allergens without a preceding species are skipped silently.
pub fn associate(
    species_matches: &[PhraseMatch],
    allergen_matches: &[PhraseMatch],
    allergen_sentiments: &AllergenSentiments,
) -> Vec<ResultRecord> {
    let species = sorted_by_end(species_matches);
    let mut records = Vec::new();

    for (allergen, sentiment) in allergen_sentiments.iter() {
        let Some(occurrence) = allergen_matches.iter().find(|m| m.text == allergen) else {
            continue;
        };

        // species is sorted by char_end, so everything before this point ends
        // at or before the allergen start.
        let preceding = species.partition_point(|s| s.char_end <= occurrence.char_start);
        let Some(nearest) = preceding.checked_sub(1).map(|pos| species[pos]) else {
            debug!(allergen, "No species precedes allergen; skipping");
            continue;
        };

        records.push(ResultRecord {
            species_name: nearest.text.clone(),
            allergen_phrase: allergen.to_string(),
            sentiment,
            species_char_start: nearest.char_start,
            species_char_end: nearest.char_end,
            allergen_char_start: occurrence.char_start,
            allergen_char_end: occurrence.char_end,
        });
    }

    records
}

fn sorted_by_end(matches: &[PhraseMatch]) -> Vec<&PhraseMatch> {
    let mut refs: Vec<&PhraseMatch> = matches.iter().collect();
    if !refs.windows(2).all(|w| w[0].char_end <= w[1].char_end) {
        warn!("Species matches are not in document order; sorting before association");
        refs.sort_by_key(|m| m.char_end);
    }
    refs
}

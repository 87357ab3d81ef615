//! Case-insensitive multi-token phrase matching.
//!
//! Phrases are tokenized with the same annotator as documents and compiled
//! once into an Aho-Corasick automaton. At match time the document tokens are
//! folded into a haystack where every token is preceded by a separator, so a
//! phrase of k tokens becomes a pattern that can only be accepted when it
//! starts and ends on token boundaries.
//!
//! Matches are returned in document order and never overlap: among candidates
//! starting at the same token the longest wins, and anything starting inside
//! an accepted match is dropped.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::annotator::Annotator;
use crate::token::{CharIndex, Token};
use crate::Result;

/// Token separator in patterns and haystacks. Never produced by folding.
const SEP: char = '\u{1f}';

/// One phrase occurrence in a document.
///
/// `start`/`end` are token indices (end exclusive); `char_start`/`char_end`
/// are character offsets into the annotated text (end exclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MatcherStats {
    pub phrase_count: usize,
    pub skipped_empty: usize,
}

/// A compiled phrase list.
pub struct PhraseMatcher {
    automaton: Option<AhoCorasick>,
    stats: MatcherStats,
}

impl PhraseMatcher {
    /// Tokenize `phrases` with `annotator` and compile them.
    pub async fn compile(phrases: &[String], annotator: &dyn Annotator) -> Result<Self> {
        let mut tokenized = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let tokens = annotator.annotate(phrase).await?;
            tokenized.push(tokens.into_iter().map(|t| t.text).collect::<Vec<_>>());
        }
        Self::from_tokenized(&tokenized)
    }

    /// Compile already tokenized phrases.
    pub fn from_tokenized(phrases: &[Vec<String>]) -> Result<Self> {
        let mut patterns: Vec<String> = Vec::with_capacity(phrases.len());
        let mut skipped_empty = 0;

        for words in phrases {
            if words.is_empty() {
                skipped_empty += 1;
                continue;
            }
            let mut pattern = String::new();
            for word in words {
                pattern.push(SEP);
                pattern.push_str(&fold(word));
            }
            patterns.push(pattern);
        }

        let stats = MatcherStats {
            phrase_count: patterns.len(),
            skipped_empty,
        };

        // Overlapping search needs the standard match semantics; overlap
        // resolution happens after boundary filtering.
        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::Standard)
                    .build(&patterns)?,
            )
        };

        info!(
            "PhraseMatcher compiled: {} phrases ({} empty skipped)",
            stats.phrase_count, stats.skipped_empty
        );

        Ok(Self { automaton, stats })
    }

    pub fn stats(&self) -> &MatcherStats {
        &self.stats
    }

    /// Find all non-overlapping phrase occurrences in `tokens`.
    ///
    /// `text` must be the string the tokens were produced from; it supplies
    /// the surface form of each match.
    pub fn find(&self, text: &str, tokens: &[Token]) -> Vec<PhraseMatch> {
        self.find_indexed(&CharIndex::new(text), tokens)
    }

    /// [`find`](Self::find) against a prebuilt char index of the text.
    pub fn find_indexed(&self, index: &CharIndex<'_>, tokens: &[Token]) -> Vec<PhraseMatch> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        if tokens.is_empty() {
            return Vec::new();
        }

        // boundaries[k] is the byte offset of the separator before token k;
        // the final entry is the trailing separator.
        let mut haystack = String::new();
        let mut boundaries = Vec::with_capacity(tokens.len() + 1);
        for token in tokens {
            boundaries.push(haystack.len());
            haystack.push(SEP);
            haystack.push_str(&fold(&token.text));
        }
        boundaries.push(haystack.len());
        haystack.push(SEP);

        let mut spans: Vec<(usize, usize)> = automaton
            .find_overlapping_iter(&haystack)
            .filter_map(|mat| {
                let start = boundaries.binary_search(&mat.start()).ok()?;
                let end = boundaries.binary_search(&mat.end()).ok()?;
                Some((start, end))
            })
            .collect();

        let spans = remove_overlapping(&mut spans);
        debug!("PhraseMatcher found {} matches over {} tokens", spans.len(), tokens.len());

        spans
            .into_iter()
            .map(|(start, end)| {
                let char_start = tokens[start].idx;
                let char_end = tokens[end - 1].end_idx();
                let surface = index
                    .slice(char_start, char_end)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        tokens[start..end]
                            .iter()
                            .map(|t| t.text.as_str())
                            .collect::<Vec<_>>()
                            .join(" ")
                    });
                PhraseMatch {
                    start,
                    end,
                    text: surface.to_lowercase(),
                    char_start,
                    char_end,
                }
            })
            .collect()
    }
}

fn fold(word: &str) -> String {
    word.to_lowercase().replace(SEP, "\u{fffd}")
}

fn remove_overlapping(spans: &mut Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    // Sort by start position, then by length (longest first)
    spans.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| (b.1 - b.0).cmp(&(a.1 - a.0))));

    let mut result = Vec::new();
    let mut last_end = 0;
    for &(start, end) in spans.iter() {
        if start >= last_end {
            last_end = end;
            result.push((start, end));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::RuleAnnotator;
    use pretty_assertions::assert_eq;

    fn words(phrases: &[&str]) -> Vec<Vec<String>> {
        phrases
            .iter()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn tokens(text: &str) -> Vec<Token> {
        RuleAnnotator::new().tokenize(text)
    }

    #[test]
    fn test_multi_token_case_insensitive() {
        let matcher = PhraseMatcher::from_tokenized(&words(&["maple tree"])).unwrap();
        let text = "A MAPLE Tree and another maple tree.";
        let found = matcher.find(text, &tokens(text));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "maple tree");
        assert_eq!((found[0].char_start, found[0].char_end), (2, 12));
        assert_eq!((found[0].start, found[0].end), (1, 3));
        assert_eq!(found[1].text, "maple tree");
        assert_eq!(&text[found[1].char_start..found[1].char_end], "maple tree");
    }

    #[test]
    fn test_token_boundaries_respected() {
        let matcher = PhraseMatcher::from_tokenized(&words(&["oak"])).unwrap();
        let text = "Oaks grow near the oak.";
        let found = matcher.find(text, &tokens(text));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].char_start, 19);
    }

    #[test]
    fn test_longest_wins_at_same_start() {
        let matcher =
            PhraseMatcher::from_tokenized(&words(&["birch", "birch pollen", "pollen"])).unwrap();
        let text = "birch pollen pollen";
        let found = matcher.find(text, &tokens(text));

        let texts: Vec<&str> = found.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["birch pollen", "pollen"]);
    }

    #[test]
    fn test_adjacent_repeats_all_found() {
        let matcher = PhraseMatcher::from_tokenized(&words(&["pollen"])).unwrap();
        let text = "pollen pollen pollen";
        let found = matcher.find(text, &tokens(text));
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0].end <= w[1].start));
    }

    #[test]
    fn test_overlap_drops_later_start() {
        let matcher = PhraseMatcher::from_tokenized(&words(&["red maple", "maple tree"])).unwrap();
        let text = "the red maple tree";
        let found = matcher.find(text, &tokens(text));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "red maple");
    }

    #[test]
    fn test_empty_phrases_and_documents() {
        let matcher = PhraseMatcher::from_tokenized(&[vec![], vec!["pollen".to_string()]]).unwrap();
        assert_eq!(matcher.stats().phrase_count, 1);
        assert_eq!(matcher.stats().skipped_empty, 1);
        assert!(matcher.find("", &[]).is_empty());

        let none = PhraseMatcher::from_tokenized(&[]).unwrap();
        let text = "pollen";
        assert!(none.find(text, &tokens(text)).is_empty());
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let matcher = PhraseMatcher::from_tokenized(&words(&["pollen"])).unwrap();
        let text = "Ça — pollen";
        let found = matcher.find(text, &tokens(text));
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].char_start, found[0].char_end), (5, 11));
    }

    #[tokio::test]
    async fn test_compile_uses_annotator_tokenization() {
        let annotator = RuleAnnotator::new();
        let phrases = vec!["Ragweed-Pollen".to_string(), "  ".to_string()];
        let matcher = PhraseMatcher::compile(&phrases, &annotator).await.unwrap();
        assert_eq!(matcher.stats().skipped_empty, 1);

        let text = "ragweed - pollen is everywhere, ragweed-pollen too";
        let found = matcher.find(text, &tokens(text));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "ragweed - pollen");
        assert_eq!(found[1].text, "ragweed-pollen");
    }
}

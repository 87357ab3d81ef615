//! Annotated tokens and character-offset helpers.

use serde::{Deserialize, Serialize};

/// Dependency label the annotators use for negation markers.
pub const NEG_DEP: &str = "neg";

/// One annotated token of a document.
///
/// `idx` is the character (not byte) offset of the token in the exact string
/// that was annotated; `i` is its position in the token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub dep: String,
    pub idx: usize,
    pub i: usize,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        dep: impl Into<String>,
        idx: usize,
        i: usize,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            dep: dep.into(),
            idx,
            i,
        }
    }

    /// Exclusive character end offset.
    pub fn end_idx(&self) -> usize {
        self.idx + self.text.chars().count()
    }

    pub fn is_neg(&self) -> bool {
        self.dep == NEG_DEP
    }
}

/// Character-to-byte offset table for one text.
///
/// Built in a single pass so that any number of char-range lookups against
/// the same text stay linear in its length.
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    // byte offset of every char, plus `text.len()` as the final entry
    bytes: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bytes.push(text.len());
        Self { text, bytes }
    }

    /// Number of chars in the text.
    pub fn char_len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Slice by character offsets `[start, end)`; `None` when out of range.
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let from = *self.bytes.get(start)?;
        let to = *self.bytes.get(end)?;
        self.text.get(from..to)
    }
}

/// Slice `text` by character offsets `[start, end)`.
///
/// Returns `None` when the range does not fit inside `text`. For repeated
/// lookups into one text build a [`CharIndex`] instead.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    CharIndex::new(text).slice(start, end)
}

/// Check that every token lies inside `text` at its claimed offset and that
/// sequence indices are contiguous from zero.
pub fn validate(text: &str, tokens: &[Token]) -> crate::Result<()> {
    validate_indexed(&CharIndex::new(text), tokens)
}

pub fn validate_indexed(index: &CharIndex<'_>, tokens: &[Token]) -> crate::Result<()> {
    for (pos, token) in tokens.iter().enumerate() {
        if token.i != pos {
            return Err(crate::NlpError::InvalidTokens(format!(
                "token {:?} has index {} at position {}",
                token.text, token.i, pos
            )));
        }
        match index.slice(token.idx, token.end_idx()) {
            Some(surface) if surface == token.text => {}
            _ => {
                return Err(crate::NlpError::InvalidTokens(format!(
                    "token {:?} does not occur at char offset {}",
                    token.text, token.idx
                )))
            }
        }
    }
    Ok(())
}

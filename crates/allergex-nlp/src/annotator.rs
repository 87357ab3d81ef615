//! Linguistic annotators: text in, tokens with lemma, dependency label and
//! character offsets out.
//!
//! The engine only depends on the [`Annotator`] trait. Two bindings exist:
//! - [`RuleAnnotator`]: built-in, offline, UAX-29 word segmentation with a
//!   small negation rule set. No parser, so every non-negation token carries
//!   the generic `dep` label.
//! - [`HttpAnnotator`]: calls an external annotation service (spaCy-style)
//!   that returns full lemma and dependency information.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::token::{Token, NEG_DEP};
use crate::{NlpError, Result};

/// Generic dependency label for tokens the rule annotator cannot classify.
const UNKNOWN_DEP: &str = "dep";

/// Negation markers the rule annotator labels `neg`.
const NEGATORS: &[&str] = &["not", "n't", "never", "no"];

#[async_trait]
pub trait Annotator: Send + Sync {
    /// Annotate `text`. Token offsets must be character offsets into `text`.
    async fn annotate(&self, text: &str) -> Result<Vec<Token>>;
}

/// Offline rule-based annotator.
#[derive(Debug, Clone, Default)]
pub struct RuleAnnotator;

impl RuleAnnotator {
    pub fn new() -> Self {
        Self
    }

    /// Segment `text` into word and punctuation tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut last_byte = 0;
        let mut last_char = 0;

        for (byte, segment) in text.split_word_bound_indices() {
            let char_idx = last_char + text[last_byte..byte].chars().count();
            last_byte = byte;
            last_char = char_idx;

            if segment.chars().all(char::is_whitespace) {
                continue;
            }

            match split_contraction(segment) {
                Some((base, suffix)) => {
                    let base_chars = base.chars().count();
                    push(&mut tokens, base, char_idx);
                    push(&mut tokens, suffix, char_idx + base_chars);
                }
                None => push(&mut tokens, segment, char_idx),
            }
        }

        tokens
    }
}

#[async_trait]
impl Annotator for RuleAnnotator {
    async fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        Ok(self.tokenize(text))
    }
}

fn push(tokens: &mut Vec<Token>, text: &str, idx: usize) {
    let lemma = lemma_of(text);
    let dep = if NEGATORS.contains(&lemma.as_str()) {
        NEG_DEP
    } else {
        UNKNOWN_DEP
    };
    let lemma = if lemma == "n't" { "not".to_string() } else { lemma };
    let i = tokens.len();
    tokens.push(Token::new(text, lemma, dep, idx, i));
}

fn lemma_of(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

/// Split `don't` into `do` + `n't`. Both straight and curly apostrophes.
fn split_contraction(segment: &str) -> Option<(&str, &str)> {
    let lower = segment.to_lowercase();
    let suffix_len = if lower.ends_with("n't") {
        "n't".len()
    } else if lower.ends_with("n\u{2019}t") {
        "n\u{2019}t".len()
    } else {
        return None;
    };
    // Lowercasing can change byte lengths; only split when it did not.
    if lower.len() != segment.len() || segment.len() <= suffix_len {
        return None;
    }
    let at = segment.len() - suffix_len;
    if !segment.is_char_boundary(at) {
        return None;
    }
    Some(segment.split_at(at))
}

/// Client for an external annotation service.
///
/// Expects `POST {base_url}/annotate` with `{"text": ...}` to answer
/// `{"tokens": [{"text", "lemma", "dep", "idx"}, ...]}`.
pub struct HttpAnnotator {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    tokens: Vec<WireToken>,
}

#[derive(Debug, Deserialize)]
struct WireToken {
    text: String,
    lemma: String,
    dep: String,
    idx: usize,
}

impl HttpAnnotator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Annotator for HttpAnnotator {
    async fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        debug!(text_len = text.len(), url = %self.base_url, "Calling annotation service");

        let resp = self
            .client
            .post(format!("{}/annotate", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                NlpError::Annotator(format!(
                    "annotation service unreachable at {}: {e}",
                    self.base_url
                ))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NlpError::Annotator(format!(
                "annotation service error {status}: {body}"
            )));
        }

        let parsed: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| NlpError::Annotator(format!("failed to parse annotation response: {e}")))?;

        Ok(parsed
            .tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| Token::new(t.text, t.lemma, t.dep, t.idx, i))
            .collect())
    }
}

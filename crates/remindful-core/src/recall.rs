//! Delayed-recall records: the free-recall transcript, missed-item
//! resolution, and cued-recall responses.
//!
//! Membership here is always exact (normalized equality). Fuzzy matching is
//! an interactive-phase concession; by the time scoring looks at these
//! records, a word either was produced or it was not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matcher::normalize;
use crate::vocabulary::{Vocabulary, VocabularyItem};

/// Ordered transcript of free-recall utterances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeRecallTranscript {
    tokens: Vec<String>,
}

impl FreeRecallTranscript {
    /// Record one utterance. Returns `false` for blank utterances, which are
    /// not stored; there is nothing to match.
    pub fn push(&mut self, token: &str) -> bool {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.tokens.push(trimmed.to_string());
        true
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Exact normalized membership.
    pub fn contains_target(&self, target: &str) -> bool {
        let target = normalize(target);
        self.tokens.iter().any(|token| normalize(token) == target)
    }
}

/// The vocabulary entries whose target never appeared in the transcript, in
/// vocabulary order. Deterministic: same inputs, same output.
pub fn missed_items(
    vocabulary: &Vocabulary,
    transcript: &FreeRecallTranscript,
) -> Vec<VocabularyItem> {
    vocabulary
        .items
        .iter()
        .filter(|item| !transcript.contains_target(&item.target))
        .cloned()
        .collect()
}

/// Responses given during cued recall, keyed by cue. An empty string is an
/// explicit "don't know".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuedRecallResponses {
    responses: HashMap<String, String>,
}

impl CuedRecallResponses {
    pub fn record(&mut self, cue: impl Into<String>, response: &str) {
        self.responses.insert(cue.into(), response.trim().to_string());
    }

    pub fn get(&self, cue: &str) -> Option<&str> {
        self.responses.get(cue).map(String::as_str)
    }

    /// A recorded skip still counts as answered.
    pub fn is_answered(&self, cue: &str) -> bool {
        self.responses.contains_key(cue)
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }
}

//! Response normalization and matching.
//!
//! Every comparison in the system goes through [`normalize`] on both sides.
//! Exact matching is normalized equality; fuzzy matching is a normalized
//! edit-distance similarity against a percentage threshold, there to
//! tolerate transcription noise during the interactive phases. Free-recall
//! membership and cued-recall scoring always use exact matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default similarity cutoff for fuzzy matching, in percent.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 85;

/// How responses are compared against targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Fuzzy,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "fuzzy" => Ok(MatchMode::Fuzzy),
            other => Err(format!("unknown match mode: {other}")),
        }
    }
}

/// A matching mode plus its fuzzy threshold (ignored in exact mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    #[serde(default = "default_mode")]
    pub mode: MatchMode,
    /// Minimum similarity in percent for a fuzzy match, `0..=100`.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
}

fn default_mode() -> MatchMode {
    MatchMode::Fuzzy
}

fn default_threshold() -> u8 {
    DEFAULT_FUZZY_THRESHOLD
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::fuzzy(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl MatchPolicy {
    pub fn exact() -> Self {
        Self {
            mode: MatchMode::Exact,
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn fuzzy(threshold: u8) -> Self {
        Self {
            mode: MatchMode::Fuzzy,
            threshold,
        }
    }

    /// Whether `response` counts as a correct answer for `target`.
    ///
    /// Both sides are normalized first. An empty normalized response never
    /// matches: it is a non-answer, not an error.
    pub fn matches(&self, response: &str, target: &str) -> bool {
        let response = normalize(response);
        if response.is_empty() {
            return false;
        }
        let target = normalize(target);
        match self.mode {
            MatchMode::Exact => response == target,
            MatchMode::Fuzzy => similarity(&response, &target) >= self.threshold,
        }
    }
}

/// Trim surrounding whitespace and case-fold.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalized edit similarity in `0..=100` (100 = identical).
///
/// Uses indel distance (insertions and deletions only; a substitution counts
/// as two edits) over the combined length, so dropping one letter of a
/// five-letter word scores 89 while substituting one scores 80.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let distance = indel_distance(&a, &b);
    (((total - distance) as f64 / total as f64) * 100.0).round() as u8
}

/// Two-row dynamic-programming indel distance over `char` sequences.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                (prev[j + 1] + 1).min(curr[j] + 1)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

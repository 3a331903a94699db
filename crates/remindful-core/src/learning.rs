//! Controlled learning: one sheet taught to criterion.
//!
//! While a sheet is on display the subject is probed cue by cue. A wrong
//! answer keeps the cue pending and it is probed again, with no limit on
//! attempts; the sheet is done only when every cue has been answered
//! correctly once. Attempt counts are kept for the report.

use std::collections::HashMap;

use crate::error::SessionError;
use crate::matcher::MatchPolicy;
use crate::vocabulary::{Sheet, VocabularyItem};

/// Result of one learning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningOutcome {
    /// The response matched; the cue is now mastered.
    Mastered,
    /// The response did not match; the cue stays pending.
    TryAgain,
    /// The cue was already mastered; nothing changed.
    AlreadyMastered,
}

/// Tracks one sheet through controlled learning.
#[derive(Debug, Clone)]
pub struct LearningTracker {
    items: Vec<VocabularyItem>,
    mastered: HashMap<String, bool>,
    attempts: HashMap<String, u32>,
    policy: MatchPolicy,
}

impl LearningTracker {
    pub fn new(sheet: &Sheet, policy: MatchPolicy) -> Self {
        let mastered = sheet
            .items
            .iter()
            .map(|item| (item.cue.clone(), false))
            .collect();
        Self {
            items: sheet.items.clone(),
            mastered,
            attempts: HashMap::new(),
            policy,
        }
    }

    /// Evaluate one response for `cue`. Mastery is monotone: once a cue is
    /// mastered, further submissions change nothing.
    pub fn submit(&mut self, cue: &str, response: &str) -> Result<LearningOutcome, SessionError> {
        let target = self
            .items
            .iter()
            .find(|item| item.cue == cue)
            .map(|item| item.target.clone())
            .ok_or_else(|| SessionError::UnknownCue(cue.to_string()))?;

        if self.is_mastered(cue) {
            return Ok(LearningOutcome::AlreadyMastered);
        }

        *self.attempts.entry(cue.to_string()).or_insert(0) += 1;
        if self.policy.matches(response, &target) {
            self.mastered.insert(cue.to_string(), true);
            Ok(LearningOutcome::Mastered)
        } else {
            Ok(LearningOutcome::TryAgain)
        }
    }

    pub fn is_mastered(&self, cue: &str) -> bool {
        self.mastered.get(cue).copied().unwrap_or(false)
    }

    /// The next unmastered cue, in sheet order.
    pub fn first_pending(&self) -> Option<&VocabularyItem> {
        self.items.iter().find(|item| !self.is_mastered(&item.cue))
    }

    /// The learning criterion: every cue on the sheet mastered.
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| self.is_mastered(&item.cue))
    }

    /// Attempts recorded for `cue` so far.
    pub fn attempts(&self, cue: &str) -> u32 {
        self.attempts.get(cue).copied().unwrap_or(0)
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }
}

//! Immediate cued recall: the two-strike reminder policy.
//!
//! After a sheet reaches criterion it is probed again without the words on
//! display. A first miss triggers a reminder (the cue and target presented
//! together) and exactly one further attempt; a second miss is final. A cue
//! answered correctly after the reminder counts fully.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::matcher::MatchPolicy;
use crate::vocabulary::{Sheet, VocabularyItem};

/// Where one cue stands in immediate recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallStatus {
    /// Not probed yet.
    Untested,
    /// Answered correctly, on the first attempt or after the reminder.
    Correct,
    /// Missed once; the reminder was shown; one attempt remains.
    Reminded,
    /// Missed again after the reminder.
    Failed,
}

impl RecallStatus {
    /// `Correct` and `Failed` take no further attempts.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecallStatus::Correct | RecallStatus::Failed)
    }
}

/// What one submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallOutcome {
    /// Terminal success.
    Correct,
    /// First miss: the driver must present the cue and target together and
    /// then probe the same cue once more.
    Reminder { target: String },
    /// Second miss. Terminal.
    Failed,
}

/// Tracks one sheet through immediate cued recall.
#[derive(Debug, Clone)]
pub struct ImmediateRecallTracker {
    items: Vec<VocabularyItem>,
    statuses: HashMap<String, RecallStatus>,
    reminded: HashSet<String>,
    policy: MatchPolicy,
}

impl ImmediateRecallTracker {
    pub fn new(sheet: &Sheet, policy: MatchPolicy) -> Self {
        let statuses = sheet
            .items
            .iter()
            .map(|item| (item.cue.clone(), RecallStatus::Untested))
            .collect();
        Self {
            items: sheet.items.clone(),
            statuses,
            reminded: HashSet::new(),
            policy,
        }
    }

    /// Evaluate one response for `cue` under the two-strike policy.
    /// Submitting to a terminal cue is a caller bug, not a third attempt.
    pub fn submit(&mut self, cue: &str, response: &str) -> Result<RecallOutcome, SessionError> {
        let target = self
            .items
            .iter()
            .find(|item| item.cue == cue)
            .map(|item| item.target.clone())
            .ok_or_else(|| SessionError::UnknownCue(cue.to_string()))?;

        match self.status(cue) {
            RecallStatus::Correct | RecallStatus::Failed => {
                Err(SessionError::AlreadyResolved(cue.to_string()))
            }
            RecallStatus::Untested => {
                if self.policy.matches(response, &target) {
                    self.statuses.insert(cue.to_string(), RecallStatus::Correct);
                    Ok(RecallOutcome::Correct)
                } else {
                    self.statuses.insert(cue.to_string(), RecallStatus::Reminded);
                    self.reminded.insert(cue.to_string());
                    Ok(RecallOutcome::Reminder { target })
                }
            }
            RecallStatus::Reminded => {
                if self.policy.matches(response, &target) {
                    self.statuses.insert(cue.to_string(), RecallStatus::Correct);
                    Ok(RecallOutcome::Correct)
                } else {
                    self.statuses.insert(cue.to_string(), RecallStatus::Failed);
                    Ok(RecallOutcome::Failed)
                }
            }
        }
    }

    pub fn status(&self, cue: &str) -> RecallStatus {
        self.statuses
            .get(cue)
            .copied()
            .unwrap_or(RecallStatus::Untested)
    }

    /// Whether `cue` consumed its reminder, regardless of how it ended.
    pub fn was_reminded(&self, cue: &str) -> bool {
        self.reminded.contains(cue)
    }

    /// The first non-terminal cue in sheet order, with whether it is
    /// awaiting its post-reminder attempt.
    pub fn next_pending(&self) -> Option<(&VocabularyItem, bool)> {
        self.items
            .iter()
            .find(|item| !self.status(&item.cue).is_terminal())
            .map(|item| (item, self.status(&item.cue) == RecallStatus::Reminded))
    }

    /// Every cue terminal.
    pub fn is_complete(&self) -> bool {
        self.items
            .iter()
            .all(|item| self.status(&item.cue).is_terminal())
    }

    pub fn correct_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| self.status(&item.cue) == RecallStatus::Correct)
            .count()
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }
}

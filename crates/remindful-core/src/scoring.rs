//! Score computation for a completed session.
//!
//! Three additive components, each reported with its maximum: immediate
//! cued recall (ICR) from the learning phases, free recall (FR) from the
//! timed transcript, and cued recall (CR) over only the items free recall
//! missed. Wrong non-blank cued answers are counted as intrusions. There is
//! no overlap correction: an item recalled freely was by definition not
//! missed, and ICR is a separate learning-phase measure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::immediate::RecallStatus;
use crate::matcher::normalize;
use crate::recall::{missed_items, CuedRecallResponses, FreeRecallTranscript};
use crate::vocabulary::Vocabulary;

/// Component scores of one administration, with their maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Cues answered correctly during immediate recall; reminder-assisted
    /// successes count fully.
    pub immediate: u32,
    pub max_immediate: u32,
    /// Vocabulary targets produced during free recall.
    pub free: u32,
    pub max_free: u32,
    /// Missed items recovered when re-cued.
    pub cued: u32,
    /// How many items free recall missed.
    pub max_cued: u32,
    /// Non-blank cued responses that named a wrong word.
    pub intrusions: u32,
    /// `immediate + free + cued`.
    pub total: u32,
}

impl Scores {
    /// Compute all components. Absent entries anywhere are non-matches;
    /// there are no failure modes.
    pub fn compute(
        vocabulary: &Vocabulary,
        immediate_statuses: &HashMap<String, RecallStatus>,
        transcript: &FreeRecallTranscript,
        cued_responses: &CuedRecallResponses,
    ) -> Self {
        let immediate = vocabulary
            .items
            .iter()
            .filter(|item| immediate_statuses.get(&item.cue) == Some(&RecallStatus::Correct))
            .count() as u32;

        let free = vocabulary
            .items
            .iter()
            .filter(|item| transcript.contains_target(&item.target))
            .count() as u32;

        let missed = missed_items(vocabulary, transcript);
        let mut cued = 0u32;
        let mut intrusions = 0u32;
        for item in &missed {
            let Some(response) = cued_responses.get(&item.cue) else {
                continue;
            };
            let response = normalize(response);
            if response.is_empty() {
                continue;
            }
            if response == normalize(&item.target) {
                cued += 1;
            } else {
                intrusions += 1;
            }
        }

        let size = vocabulary.len() as u32;
        Scores {
            immediate,
            max_immediate: size,
            free,
            max_free: size,
            cued,
            max_cued: missed.len() as u32,
            intrusions,
            total: immediate + free + cued,
        }
    }

    /// The ceiling of `total` for this administration; nominally 48 for the
    /// canonical 16-item vocabulary with nothing recalled freely.
    pub fn max_total(&self) -> u32 {
        self.max_immediate + self.max_free + self.max_cued
    }
}

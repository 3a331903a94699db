//! The interference phase: distraction tasks and the response tally.
//!
//! Between learning and delayed recall the subject works on unrelated
//! tasks for a fixed time. Responses are tallied for the record but never
//! gate the phase; only timer expiry ends interference.

use serde::{Deserialize, Serialize};

/// A distraction task read to the subject during interference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterferenceTask {
    pub id: String,
    /// The instruction read verbatim to the subject.
    pub instruction: String,
}

/// The canonical pair of distraction tasks.
pub fn standard_tasks() -> Vec<InterferenceTask> {
    vec![
        InterferenceTask {
            id: "animal-fluency".into(),
            instruction: "Name as many animals as you can".into(),
        },
        InterferenceTask {
            id: "serial-threes".into(),
            instruction: "Count backwards from 100 by 3s".into(),
        },
    ]
}

/// Ordered record of stimulus responses given during interference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterferenceTally {
    responses: Vec<String>,
}

impl InterferenceTally {
    pub fn record(&mut self, stimulus: impl Into<String>) {
        self.responses.push(stimulus.into());
    }

    pub fn count(&self) -> usize {
        self.responses.len()
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }
}

//! The session phase controller.
//!
//! One administration is a pure state machine: the driver renders the
//! current [`Prompt`], feeds back [`SessionEvent`]s, and the controller
//! walks the fixed phase sequence
//! introduction → (controlled learning ↔ immediate recall, sheet by sheet)
//! → interference → free recall → cued recall → results.
//!
//! The controller never blocks, sleeps, or reads a clock. Timed phases work
//! by the driver asking [`SessionState::time_remaining`] and feeding
//! [`SessionEvent::TimerExpired`] when the deadline passes. Events a phase
//! does not accept are guard violations: driver bugs, surfaced as errors,
//! never silently reordered.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::SessionError;
use crate::immediate::{ImmediateRecallTracker, RecallOutcome, RecallStatus};
use crate::interference::{standard_tasks, InterferenceTally, InterferenceTask};
use crate::learning::{LearningOutcome, LearningTracker};
use crate::matcher::{normalize, MatchPolicy};
use crate::recall::{missed_items, CuedRecallResponses, FreeRecallTranscript};
use crate::report::{
    CuedOutcome, CuedResult, ItemOutcome, SessionReport, SheetOutcome, VocabularySummary,
};
use crate::scoring::Scores;
use crate::vocabulary::{Sheet, Vocabulary, VocabularyItem};

/// Default length of the interference phase in seconds.
pub const DEFAULT_INTERFERENCE_SECS: u64 = 120;

/// Default length of the free-recall phase in seconds.
pub const DEFAULT_FREE_RECALL_SECS: u64 = 90;

const DEFAULT_INSTRUCTIONS: &str = "You will learn a list of words, each paired with a \
category cue. The words are shown a few at a time; learn each word together with its cue. \
Your memory for the words will then be tested in several ways. Confirm when you are ready \
to begin.";

/// The phases of one administration, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Introduction,
    ControlledLearning,
    ImmediateRecall,
    Interference,
    FreeRecall,
    CuedRecall,
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Introduction => "introduction",
            Phase::ControlledLearning => "controlled_learning",
            Phase::ImmediateRecall => "immediate_recall",
            Phase::Interference => "interference",
            Phase::FreeRecall => "free_recall",
            Phase::CuedRecall => "cued_recall",
            Phase::Results => "results",
        };
        write!(f, "{name}")
    }
}

/// External events a driver can feed the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The subject acknowledged the current presentation.
    Confirmed,
    /// The subject answered the current prompt.
    ResponseSubmitted(String),
    /// One stimulus response produced during interference.
    StimulusFlagged(String),
    /// The driver's deadline for the current timed phase passed.
    TimerExpired,
}

impl SessionEvent {
    /// Short name used in guard-violation errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Confirmed => "confirm",
            SessionEvent::ResponseSubmitted(_) => "response",
            SessionEvent::StimulusFlagged(_) => "stimulus",
            SessionEvent::TimerExpired => "timer",
        }
    }
}

/// What the driver must present next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Opening instructions; expects confirmation.
    Introduction { instructions: String },
    /// A sheet of items to study; expects confirmation.
    SheetPresentation {
        sheet_index: usize,
        items: Vec<VocabularyItem>,
    },
    /// Probe one cue while the sheet is on display; `choices` are the
    /// sheet's targets.
    LearningCue {
        sheet_index: usize,
        cue: String,
        choices: Vec<String>,
    },
    /// Probe one cue from memory. `reminder` carries the target when this is
    /// the post-reminder attempt; the driver must present both together.
    RecallCue {
        sheet_index: usize,
        cue: String,
        reminder: Option<String>,
    },
    /// Timed distraction tasks; stimulus responses are tallied.
    Interference {
        tasks: Vec<InterferenceTask>,
        duration: Duration,
    },
    /// Timed free recall; every utterance is captured.
    FreeRecall { duration: Duration },
    /// Probe one missed item; an empty response records a skip.
    CuedRecall { cue: String, remaining: usize },
}

/// What one applied event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// A presentation was acknowledged.
    Confirmed,
    /// A learning response matched; the cue is mastered.
    LearningMastered { cue: String },
    /// A learning response missed; the same cue will be probed again.
    LearningRetry { cue: String },
    /// An immediate-recall response matched.
    RecallCorrect { cue: String },
    /// A first miss: the reminder must be presented, then the cue re-probed.
    ReminderIssued { cue: String, target: String },
    /// A second miss; the cue is closed out.
    RecallFailed { cue: String },
    /// A free-recall utterance was captured (empty when blank; blanks are
    /// not stored).
    TokenCaptured { token: String },
    /// An interference stimulus was tallied.
    StimulusTallied { count: usize },
    /// A cued-recall response was recorded.
    CuedResponseRecorded { cue: String, skipped: bool },
    /// A timed phase ran out.
    PhaseEnded { phase: Phase },
}

/// Tunable parameters of one administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Matching during controlled learning, while the sheet is on display.
    #[serde(default)]
    pub learning_matching: MatchPolicy,
    /// Matching during immediate cued recall.
    #[serde(default = "default_immediate_matching")]
    pub immediate_matching: MatchPolicy,
    /// Length of the interference phase in seconds.
    #[serde(default = "default_interference_secs")]
    pub interference_secs: u64,
    /// Length of the free-recall phase in seconds.
    #[serde(default = "default_free_recall_secs")]
    pub free_recall_secs: u64,
    /// Distraction tasks read during interference.
    #[serde(default = "standard_tasks")]
    pub interference_tasks: Vec<InterferenceTask>,
    /// Who is taking the test.
    #[serde(default)]
    pub subject: Option<String>,
    /// Opening instructions read to the subject.
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

fn default_immediate_matching() -> MatchPolicy {
    MatchPolicy::exact()
}

fn default_interference_secs() -> u64 {
    DEFAULT_INTERFERENCE_SECS
}

fn default_free_recall_secs() -> u64 {
    DEFAULT_FREE_RECALL_SECS
}

fn default_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            learning_matching: MatchPolicy::default(),
            immediate_matching: default_immediate_matching(),
            interference_secs: DEFAULT_INTERFERENCE_SECS,
            free_recall_secs: DEFAULT_FREE_RECALL_SECS,
            interference_tasks: standard_tasks(),
            subject: None,
            instructions: default_instructions(),
        }
    }
}

/// A single administration in progress.
///
/// Values are independent: two sessions never share state.
#[derive(Debug)]
pub struct SessionState {
    config: SessionConfig,
    vocabulary: Vocabulary,
    sheets: Vec<Sheet>,
    phase: Phase,
    sheet_index: usize,
    sheet_presented: bool,
    learning: Vec<LearningTracker>,
    immediate: Vec<ImmediateRecallTracker>,
    interference: InterferenceTally,
    transcript: FreeRecallTranscript,
    missed: Vec<VocabularyItem>,
    cued: CuedRecallResponses,
}

impl SessionState {
    /// Validate the vocabulary and start a session at the introduction.
    pub fn new(vocabulary: Vocabulary, config: SessionConfig) -> Result<Self, SessionError> {
        if vocabulary.is_empty() {
            return Err(SessionError::InvalidVocabulary(
                "vocabulary has no items".into(),
            ));
        }
        if vocabulary.sheet_size == 0 {
            return Err(SessionError::InvalidVocabulary(
                "sheet size must be at least 1".into(),
            ));
        }
        let mut seen = HashMap::new();
        for item in &vocabulary.items {
            if item.cue.trim().is_empty() {
                return Err(SessionError::InvalidVocabulary("blank cue".into()));
            }
            if item.target.trim().is_empty() {
                return Err(SessionError::InvalidVocabulary(format!(
                    "blank target for cue '{}'",
                    item.cue
                )));
            }
            if seen.insert(item.cue.clone(), ()).is_some() {
                return Err(SessionError::InvalidVocabulary(format!(
                    "duplicate cue '{}'",
                    item.cue
                )));
            }
        }

        let sheets = vocabulary.sheets();
        debug!(
            vocabulary = %vocabulary.id,
            items = vocabulary.len(),
            sheets = sheets.len(),
            "session created"
        );
        Ok(Self {
            config,
            vocabulary,
            sheets,
            phase: Phase::Introduction,
            sheet_index: 0,
            sheet_presented: false,
            learning: Vec::new(),
            immediate: Vec::new(),
            interference: InterferenceTally::default(),
            transcript: FreeRecallTranscript::default(),
            missed: Vec::new(),
            cued: CuedRecallResponses::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn interference_duration(&self) -> Duration {
        Duration::from_secs(self.config.interference_secs)
    }

    fn free_recall_duration(&self) -> Duration {
        Duration::from_secs(self.config.free_recall_secs)
    }

    /// What the driver should present now; `None` once results are ready.
    pub fn prompt(&self) -> Option<Prompt> {
        match self.phase {
            Phase::Introduction => Some(Prompt::Introduction {
                instructions: self.config.instructions.clone(),
            }),
            Phase::ControlledLearning => {
                let sheet = &self.sheets[self.sheet_index];
                if !self.sheet_presented {
                    return Some(Prompt::SheetPresentation {
                        sheet_index: sheet.index,
                        items: sheet.items.clone(),
                    });
                }
                self.learning[self.sheet_index]
                    .first_pending()
                    .map(|item| Prompt::LearningCue {
                        sheet_index: sheet.index,
                        cue: item.cue.clone(),
                        choices: sheet.targets(),
                    })
            }
            Phase::ImmediateRecall => self.immediate[self.sheet_index].next_pending().map(
                |(item, awaiting_second)| Prompt::RecallCue {
                    sheet_index: self.sheet_index,
                    cue: item.cue.clone(),
                    reminder: awaiting_second.then(|| item.target.clone()),
                },
            ),
            Phase::Interference => Some(Prompt::Interference {
                tasks: self.config.interference_tasks.clone(),
                duration: self.interference_duration(),
            }),
            Phase::FreeRecall => Some(Prompt::FreeRecall {
                duration: self.free_recall_duration(),
            }),
            Phase::CuedRecall => {
                let remaining = self
                    .missed
                    .iter()
                    .filter(|item| !self.cued.is_answered(&item.cue))
                    .count();
                self.missed
                    .iter()
                    .find(|item| !self.cued.is_answered(&item.cue))
                    .map(|item| Prompt::CuedRecall {
                        cue: item.cue.clone(),
                        remaining,
                    })
            }
            Phase::Results => None,
        }
    }

    /// Time left in the current timed phase, `None` outside one. `elapsed`
    /// is measured by the driver from the moment the phase was presented.
    pub fn time_remaining(&self, elapsed: Duration) -> Option<Duration> {
        let limit = match self.phase {
            Phase::Interference => self.interference_duration(),
            Phase::FreeRecall => self.free_recall_duration(),
            _ => return None,
        };
        Some(limit.saturating_sub(elapsed))
    }

    /// Apply one event. This is the only mutator on a session.
    pub fn apply(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match self.phase {
            Phase::Introduction => self.apply_introduction(event),
            Phase::ControlledLearning => self.apply_learning(event),
            Phase::ImmediateRecall => self.apply_immediate(event),
            Phase::Interference => self.apply_interference(event),
            Phase::FreeRecall => self.apply_free_recall(event),
            Phase::CuedRecall => self.apply_cued_recall(event),
            Phase::Results => Err(self.guard(&event)),
        }
    }

    fn guard(&self, event: &SessionEvent) -> SessionError {
        SessionError::GuardViolation {
            phase: self.phase,
            event: event.kind(),
        }
    }

    fn guard_for(&self, event: &'static str) -> SessionError {
        SessionError::GuardViolation {
            phase: self.phase,
            event,
        }
    }

    /// Set up learning for `index` with the presentation pending.
    fn begin_sheet(&mut self, index: usize) {
        self.sheet_index = index;
        self.sheet_presented = false;
        self.learning.push(LearningTracker::new(
            &self.sheets[index],
            self.config.learning_matching,
        ));
        debug!(sheet = index, "controlled learning begins");
    }

    fn apply_introduction(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match event {
            SessionEvent::Confirmed => {
                self.begin_sheet(0);
                self.phase = Phase::ControlledLearning;
                Ok(Feedback::Confirmed)
            }
            other => Err(self.guard(&other)),
        }
    }

    fn apply_learning(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        if !self.sheet_presented {
            return match event {
                SessionEvent::Confirmed => {
                    self.sheet_presented = true;
                    Ok(Feedback::Confirmed)
                }
                other => Err(self.guard(&other)),
            };
        }
        match event {
            SessionEvent::ResponseSubmitted(response) => {
                let Some(cue) = self.learning[self.sheet_index]
                    .first_pending()
                    .map(|item| item.cue.clone())
                else {
                    return Err(self.guard_for("response"));
                };
                let outcome = self.learning[self.sheet_index].submit(&cue, &response)?;
                match outcome {
                    LearningOutcome::Mastered | LearningOutcome::AlreadyMastered => {
                        if self.learning[self.sheet_index].is_complete() {
                            self.immediate.push(ImmediateRecallTracker::new(
                                &self.sheets[self.sheet_index],
                                self.config.immediate_matching,
                            ));
                            self.phase = Phase::ImmediateRecall;
                            debug!(sheet = self.sheet_index, "sheet reached criterion");
                        }
                        Ok(Feedback::LearningMastered { cue })
                    }
                    LearningOutcome::TryAgain => Ok(Feedback::LearningRetry { cue }),
                }
            }
            other => Err(self.guard(&other)),
        }
    }

    fn apply_immediate(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match event {
            SessionEvent::ResponseSubmitted(response) => {
                let Some(cue) = self.immediate[self.sheet_index]
                    .next_pending()
                    .map(|(item, _)| item.cue.clone())
                else {
                    return Err(self.guard_for("response"));
                };
                let outcome = self.immediate[self.sheet_index].submit(&cue, &response)?;
                let feedback = match outcome {
                    RecallOutcome::Correct => Feedback::RecallCorrect { cue },
                    RecallOutcome::Reminder { target } => Feedback::ReminderIssued { cue, target },
                    RecallOutcome::Failed => Feedback::RecallFailed { cue },
                };
                if self.immediate[self.sheet_index].is_complete() {
                    let next = self.sheet_index + 1;
                    if next < self.sheets.len() {
                        self.begin_sheet(next);
                        self.phase = Phase::ControlledLearning;
                    } else {
                        self.phase = Phase::Interference;
                        debug!("all sheets probed; interference begins");
                    }
                }
                Ok(feedback)
            }
            other => Err(self.guard(&other)),
        }
    }

    fn apply_interference(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match event {
            SessionEvent::StimulusFlagged(stimulus)
            | SessionEvent::ResponseSubmitted(stimulus) => {
                self.interference.record(stimulus);
                Ok(Feedback::StimulusTallied {
                    count: self.interference.count(),
                })
            }
            SessionEvent::TimerExpired => {
                debug!(
                    responses = self.interference.count(),
                    "interference ended"
                );
                self.phase = Phase::FreeRecall;
                Ok(Feedback::PhaseEnded {
                    phase: Phase::Interference,
                })
            }
            other => Err(self.guard(&other)),
        }
    }

    fn apply_free_recall(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match event {
            SessionEvent::ResponseSubmitted(token) => {
                let stored = self.transcript.push(&token);
                Ok(Feedback::TokenCaptured {
                    token: if stored {
                        token.trim().to_string()
                    } else {
                        String::new()
                    },
                })
            }
            SessionEvent::TimerExpired => {
                self.missed = missed_items(&self.vocabulary, &self.transcript);
                debug!(
                    recalled = self.transcript.len(),
                    missed = self.missed.len(),
                    "free recall ended"
                );
                // nothing missed means the cued phase has no work; a phase
                // that would accept no event must not be entered
                self.phase = if self.missed.is_empty() {
                    Phase::Results
                } else {
                    Phase::CuedRecall
                };
                Ok(Feedback::PhaseEnded {
                    phase: Phase::FreeRecall,
                })
            }
            other => Err(self.guard(&other)),
        }
    }

    fn apply_cued_recall(&mut self, event: SessionEvent) -> Result<Feedback, SessionError> {
        match event {
            SessionEvent::ResponseSubmitted(response) => {
                let Some(cue) = self
                    .missed
                    .iter()
                    .find(|item| !self.cued.is_answered(&item.cue))
                    .map(|item| item.cue.clone())
                else {
                    return Err(self.guard_for("response"));
                };
                let skipped = response.trim().is_empty();
                self.cued.record(cue.clone(), &response);
                if self
                    .missed
                    .iter()
                    .all(|item| self.cued.is_answered(&item.cue))
                {
                    self.phase = Phase::Results;
                    debug!("cued recall complete; results ready");
                }
                Ok(Feedback::CuedResponseRecorded { cue, skipped })
            }
            other => Err(self.guard(&other)),
        }
    }

    fn immediate_statuses(&self) -> HashMap<String, RecallStatus> {
        let mut statuses = HashMap::new();
        for tracker in &self.immediate {
            for item in tracker.items() {
                statuses.insert(item.cue.clone(), tracker.status(&item.cue));
            }
        }
        statuses
    }

    fn sheet_outcomes(&self) -> Vec<SheetOutcome> {
        self.sheets
            .iter()
            .map(|sheet| SheetOutcome {
                index: sheet.index,
                items: sheet
                    .items
                    .iter()
                    .map(|item| ItemOutcome {
                        cue: item.cue.clone(),
                        target: item.target.clone(),
                        learning_attempts: self
                            .learning
                            .get(sheet.index)
                            .map(|t| t.attempts(&item.cue))
                            .unwrap_or(0),
                        recall: self
                            .immediate
                            .get(sheet.index)
                            .map(|t| t.status(&item.cue))
                            .unwrap_or(RecallStatus::Untested),
                        reminded: self
                            .immediate
                            .get(sheet.index)
                            .map(|t| t.was_reminded(&item.cue))
                            .unwrap_or(false),
                    })
                    .collect(),
            })
            .collect()
    }

    fn cued_outcomes(&self) -> Vec<CuedOutcome> {
        self.missed
            .iter()
            .map(|item| {
                let response = self.cued.get(&item.cue).unwrap_or("").to_string();
                let result = if normalize(&response).is_empty() {
                    CuedResult::Skipped
                } else if normalize(&response) == normalize(&item.target) {
                    CuedResult::Correct
                } else {
                    CuedResult::Intrusion
                };
                CuedOutcome {
                    cue: item.cue.clone(),
                    target: item.target.clone(),
                    response,
                    result,
                }
            })
            .collect()
    }

    /// Assemble the scored report. `Some` only once the session reached
    /// results; `elapsed` is the wall-clock length the driver measured.
    pub fn report(&self, elapsed: Duration) -> Option<SessionReport> {
        if self.phase != Phase::Results {
            return None;
        }
        let scores = Scores::compute(
            &self.vocabulary,
            &self.immediate_statuses(),
            &self.transcript,
            &self.cued,
        );
        Some(SessionReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            subject: self.config.subject.clone(),
            vocabulary: VocabularySummary {
                id: self.vocabulary.id.clone(),
                name: self.vocabulary.name.clone(),
                version: self.vocabulary.version.clone(),
                item_count: self.vocabulary.len(),
                sheet_count: self.sheets.len(),
            },
            scores,
            sheets: self.sheet_outcomes(),
            transcript: self.transcript.tokens().to_vec(),
            missed: self.missed.clone(),
            cued: self.cued_outcomes(),
            interference_responses: self.interference.responses().to_vec(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

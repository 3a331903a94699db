//! Session and driver error types.
//!
//! Defined in `remindful-core` so the runner can classify failures without
//! string matching: configuration problems are the operator's to fix, guard
//! violations are driver programming bugs, and source errors describe the
//! capture channel. Subject behavior (wrong answers, blank answers, running
//! out the clock) is never an error.

use thiserror::Error;

use crate::session::Phase;

/// Errors raised by the session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The vocabulary cannot support a session.
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// An event arrived that the current phase does not accept.
    #[error("event '{event}' is not valid during the {phase} phase")]
    GuardViolation { phase: Phase, event: &'static str },

    /// A response was submitted for a cue the active sheet does not contain.
    #[error("unknown cue: '{0}'")]
    UnknownCue(String),

    /// A response was submitted for a cue that already reached a terminal
    /// status.
    #[error("cue '{0}' has already been resolved")]
    AlreadyResolved(String),
}

impl SessionError {
    /// Returns `true` for errors caused by the driver feeding events the
    /// protocol forbids, as opposed to bad configuration.
    pub fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            SessionError::GuardViolation { .. }
                | SessionError::UnknownCue(_)
                | SessionError::AlreadyResolved(_)
        )
    }
}

/// Errors raised by prompt sinks and response sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading or writing the underlying channel failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scripted reply file could not be used.
    #[error("script error: {0}")]
    Script(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_violations_are_classified() {
        let err = SessionError::GuardViolation {
            phase: Phase::Introduction,
            event: "response",
        };
        assert!(err.is_guard_violation());
        assert!(SessionError::UnknownCue("fruit".into()).is_guard_violation());
        assert!(SessionError::AlreadyResolved("fruit".into()).is_guard_violation());
        assert!(!SessionError::InvalidVocabulary("empty".into()).is_guard_violation());
    }

    #[test]
    fn guard_violation_names_phase_and_event() {
        let err = SessionError::GuardViolation {
            phase: Phase::Results,
            event: "timer",
        };
        let message = err.to_string();
        assert!(message.contains("results"));
        assert!(message.contains("timer"));
    }
}

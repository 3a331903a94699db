//! Boundary traits between the session controller and its front end.
//!
//! These async traits are implemented by the `remindful-sources` crate; the
//! `remindful-runner` crate drives sessions through them.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::session::{Feedback, Prompt};

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// One reply pulled from a response source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line of subject input.
    Text(String),
    /// The source declares the current timed phase over. Real consoles never
    /// produce this; scripted sources use it to end timed phases on cue.
    Expired,
    /// No further input will ever arrive.
    Closed,
}

// ---------------------------------------------------------------------------
// Prompt sink trait
// ---------------------------------------------------------------------------

/// Trait for surfaces that present prompts and feedback to the subject.
#[async_trait]
pub trait PromptSink: Send + Sync {
    /// Present what the subject must see next.
    async fn present(&self, prompt: &Prompt) -> Result<(), SourceError>;

    /// Surface what the last event did (reminders, retries, phase endings).
    async fn feedback(&self, feedback: &Feedback) -> Result<(), SourceError>;
}

// ---------------------------------------------------------------------------
// Response source trait
// ---------------------------------------------------------------------------

/// Trait for surfaces that produce subject replies.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Await the next reply. Must be cancellation-safe: during timed phases
    /// the runner drops this future when the phase deadline passes.
    async fn next_reply(&self) -> Result<Reply, SourceError>;
}

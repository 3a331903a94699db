//! Interactive console front end.
//!
//! Prompts render to stdout; replies are read line by line from stdin. The
//! text builders are plain functions so rendering is testable without a
//! terminal.

use std::fmt::Write as _;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use remindful_core::error::SourceError;
use remindful_core::session::{Feedback, Prompt};
use remindful_core::traits::{PromptSink, Reply, ResponseSource};

/// Console front end implementing both sides of the session boundary.
pub struct ConsoleInteraction {
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleInteraction {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a prompt as console text.
pub fn render_prompt(prompt: &Prompt) -> String {
    match prompt {
        Prompt::Introduction { instructions } => {
            format!("\n{instructions}\n\n(press Enter to begin)")
        }
        Prompt::SheetPresentation { sheet_index, items } => {
            let mut text = format!("\n--- Sheet {} ---\n", sheet_index + 1);
            for item in items {
                let _ = writeln!(text, "  the {} is: {}", item.cue, item.target);
            }
            text.push_str("Study these, then press Enter.");
            text
        }
        Prompt::LearningCue { cue, choices, .. } => {
            format!(
                "Looking at the sheet, which word is the {cue}?\n  (shown: {})",
                choices.join(", ")
            )
        }
        Prompt::RecallCue { cue, reminder, .. } => match reminder {
            Some(target) => format!("The {cue} was: {target}\nWhat was the {cue}?"),
            None => format!("What was the {cue}?"),
        },
        Prompt::Interference { tasks, duration } => {
            let mut text = format!("\n--- Distraction ({} seconds) ---\n", duration.as_secs());
            for task in tasks {
                let _ = writeln!(text, "  - {}", task.instruction);
            }
            text.push_str("Type each answer and press Enter; the clock runs on its own.");
            text
        }
        Prompt::FreeRecall { duration } => {
            format!(
                "\n--- Free recall ({} seconds) ---\n\
                 Type every word from the list you can remember, one per line.",
                duration.as_secs()
            )
        }
        Prompt::CuedRecall { cue, remaining } => {
            format!("What was the {cue}? ({remaining} left; Enter to skip)")
        }
    }
}

/// Render feedback as console text; `None` stays silent.
///
/// Reminders say nothing here: the re-probe prompt carries the reminder
/// line itself, so a spoken version would just repeat it.
pub fn render_feedback(feedback: &Feedback) -> Option<String> {
    match feedback {
        Feedback::LearningMastered { .. } | Feedback::RecallCorrect { .. } => {
            Some("Correct.".into())
        }
        Feedback::LearningRetry { .. } => {
            Some("Not quite. Find it on the sheet and try again.".into())
        }
        Feedback::RecallFailed { .. } => Some("Moving on.".into()),
        Feedback::PhaseEnded { phase } => match phase {
            remindful_core::session::Phase::Interference => {
                Some("Time. Now, the words you learned.".into())
            }
            _ => Some("Time.".into()),
        },
        Feedback::Confirmed
        | Feedback::ReminderIssued { .. }
        | Feedback::TokenCaptured { .. }
        | Feedback::StimulusTallied { .. }
        | Feedback::CuedResponseRecorded { .. } => None,
    }
}

#[async_trait]
impl PromptSink for ConsoleInteraction {
    async fn present(&self, prompt: &Prompt) -> Result<(), SourceError> {
        let mut out = tokio::io::stdout();
        out.write_all(render_prompt(prompt).as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }

    async fn feedback(&self, feedback: &Feedback) -> Result<(), SourceError> {
        if let Some(text) = render_feedback(feedback) {
            let mut out = tokio::io::stdout();
            out.write_all(text.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseSource for ConsoleInteraction {
    async fn next_reply(&self) -> Result<Reply, SourceError> {
        let mut input = self.input.lock().await;
        match input.next_line().await? {
            Some(line) => Ok(Reply::Text(line)),
            None => Ok(Reply::Closed),
        }
    }
}

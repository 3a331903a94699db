//! remindful-runner — Drives a session against an interactive front end.
//!
//! The controller in `remindful-core` is a pure state machine; this crate
//! owns the loop around it: presenting prompts, awaiting replies, holding
//! the wall-clock deadline during timed phases, and assembling the final
//! report.

pub mod observer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

use remindful_core::report::SessionReport;
use remindful_core::session::{Prompt, SessionConfig, SessionEvent, SessionState};
use remindful_core::traits::{PromptSink, Reply, ResponseSource};
use remindful_core::vocabulary::Vocabulary;

use crate::observer::SessionObserver;

/// Drives one session at a time over a prompt sink and a response source.
pub struct SessionRunner {
    sink: Arc<dyn PromptSink>,
    source: Arc<dyn ResponseSource>,
}

impl SessionRunner {
    pub fn new(sink: Arc<dyn PromptSink>, source: Arc<dyn ResponseSource>) -> Self {
        Self { sink, source }
    }

    /// Administer one full session and return its scored report.
    ///
    /// Errors mean the administration broke: an invalid vocabulary, a
    /// closed input source, or an event the current phase cannot accept.
    /// Subject mistakes are never errors.
    pub async fn run(
        &self,
        vocabulary: Vocabulary,
        config: SessionConfig,
        observer: &dyn SessionObserver,
    ) -> Result<SessionReport> {
        let mut session = SessionState::new(vocabulary, config)?;
        let start = Instant::now();
        let mut phase_started = Instant::now();
        let mut presented_this_phase = false;

        while let Some(prompt) = session.prompt() {
            // Timed phases keep one prompt on display for their whole
            // span; everything else is re-presented per event so a retried
            // cue shows up again.
            let timed = session.time_remaining(Duration::ZERO).is_some();
            if !timed || !presented_this_phase {
                self.sink.present(&prompt).await?;
                presented_this_phase = true;
            }

            let remaining = session.time_remaining(phase_started.elapsed());
            let event = match self.await_reply(remaining).await? {
                Some(reply) => map_reply(reply, &prompt)?,
                None => SessionEvent::TimerExpired,
            };

            let before = session.phase();
            let feedback = session.apply(event)?;
            self.sink.feedback(&feedback).await?;
            observer.on_feedback(&feedback);

            let after = session.phase();
            if before != after {
                debug!(%before, %after, "phase change");
                observer.on_phase_change(before, after);
                phase_started = Instant::now();
                presented_this_phase = false;
            }
        }

        let elapsed = start.elapsed();
        let report = session
            .report(elapsed)
            .context("session ended without reaching results")?;
        observer.on_complete(&report, elapsed);
        Ok(report)
    }

    /// Wait for the next reply, bounded by the phase deadline when one is
    /// in force. `None` means the deadline passed first.
    async fn await_reply(&self, remaining: Option<Duration>) -> Result<Option<Reply>> {
        match remaining {
            Some(limit) => match tokio::time::timeout(limit, self.source.next_reply()).await {
                Ok(reply) => Ok(Some(reply?)),
                Err(_) => Ok(None),
            },
            None => Ok(Some(self.source.next_reply().await?)),
        }
    }
}

/// Translate a raw reply into the event the current prompt calls for.
fn map_reply(reply: Reply, prompt: &Prompt) -> Result<SessionEvent> {
    let event = match reply {
        Reply::Expired => SessionEvent::TimerExpired,
        Reply::Closed => anyhow::bail!("session abandoned: input source closed"),
        Reply::Text(text) => match prompt {
            // any input acknowledges a presentation
            Prompt::Introduction { .. } | Prompt::SheetPresentation { .. } => {
                SessionEvent::Confirmed
            }
            Prompt::Interference { .. } => SessionEvent::StimulusFlagged(text),
            _ => SessionEvent::ResponseSubmitted(text),
        },
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    use remindful_sources::scripted::{NullSink, ScriptedSource};
    use remindful_core::vocabulary::VocabularyItem;

    fn vocab_4() -> Vocabulary {
        Vocabulary {
            id: "v4".into(),
            name: "Four items".into(),
            description: String::new(),
            version: "list-a".into(),
            items: vec![
                VocabularyItem::new("fruit", "apple"),
                VocabularyItem::new("vehicle", "truck"),
                VocabularyItem::new("furniture", "couch"),
                VocabularyItem::new("animal", "dog"),
            ],
            sheet_size: 4,
        }
    }

    fn exact_config() -> SessionConfig {
        SessionConfig {
            learning_matching: remindful_core::matcher::MatchPolicy::exact(),
            ..SessionConfig::default()
        }
    }

    fn runner_for(script: &str) -> SessionRunner {
        SessionRunner::new(
            Arc::new(NullSink),
            Arc::new(ScriptedSource::from_text(script)),
        )
    }

    #[test]
    fn text_confirms_presentations() {
        let prompt = Prompt::Introduction {
            instructions: "hello".into(),
        };
        let event = map_reply(Reply::Text("anything".into()), &prompt).unwrap();
        assert_eq!(event, SessionEvent::Confirmed);
    }

    #[test]
    fn text_during_interference_is_a_stimulus() {
        let prompt = Prompt::Interference {
            tasks: vec![],
            duration: Duration::from_secs(120),
        };
        let event = map_reply(Reply::Text("cat".into()), &prompt).unwrap();
        assert_eq!(event, SessionEvent::StimulusFlagged("cat".into()));
    }

    #[test]
    fn closed_reply_is_an_error() {
        let prompt = Prompt::FreeRecall {
            duration: Duration::from_secs(90),
        };
        let err = map_reply(Reply::Closed, &prompt).unwrap_err();
        assert!(err.to_string().contains("abandoned"));
    }

    #[tokio::test]
    async fn scripted_session_reaches_results() {
        let script = "\
ok
ok
apple
truck
couch
dog
apple
truck
couch
dog
cat
<<expire>>
apple
truck
<<expire>>
couch

";
        let runner = runner_for(script);
        let report = runner
            .run(vocab_4(), exact_config(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(report.scores.immediate, 4);
        assert_eq!(report.scores.free, 2);
        assert_eq!(report.scores.cued, 1);
        assert_eq!(report.scores.intrusions, 0);
        assert_eq!(report.scores.total, 7);
        assert_eq!(report.interference_responses, vec!["cat"]);
    }

    #[tokio::test]
    async fn exhausted_script_aborts_the_session() {
        let runner = runner_for("ok\nok\napple\n");
        let err = runner
            .run(vocab_4(), exact_config(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("abandoned"));
    }

    #[tokio::test]
    async fn misplaced_expire_is_a_guard_violation() {
        // <<expire>> during the introduction: no timer is running
        let runner = runner_for("<<expire>>\n");
        let err = runner
            .run(vocab_4(), exact_config(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not valid during"));
    }
}

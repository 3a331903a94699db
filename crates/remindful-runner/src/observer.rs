//! Progress observation for running sessions.

use std::time::Duration;

use remindful_core::report::SessionReport;
use remindful_core::session::{Feedback, Phase};

/// Observation trait for session progress.
///
/// The administering side of a session (progress bars, logs, recording)
/// hangs off this; the subject-facing side goes through the prompt sink.
pub trait SessionObserver: Send + Sync {
    fn on_phase_change(&self, from: Phase, to: Phase);
    fn on_feedback(&self, feedback: &Feedback);
    fn on_complete(&self, report: &SessionReport, elapsed: Duration);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_phase_change(&self, _: Phase, _: Phase) {}
    fn on_feedback(&self, _: &Feedback) {}
    fn on_complete(&self, _: &SessionReport, _: Duration) {}
}

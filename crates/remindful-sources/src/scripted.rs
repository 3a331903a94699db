//! Scripted replies for testing and unattended runs.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use remindful_core::error::SourceError;
use remindful_core::session::{Feedback, Prompt};
use remindful_core::traits::{PromptSink, Reply, ResponseSource};

/// The script line that ends the current timed phase.
pub const EXPIRE_DIRECTIVE: &str = "<<expire>>";

/// A response source that plays back a fixed script.
///
/// One reply per line. Lines starting with `#` are comments; blank lines
/// are real replies (an empty answer is how cued recall is skipped). The
/// `<<expire>>` directive yields [`Reply::Expired`]; once the script runs
/// out every further pull yields [`Reply::Closed`].
#[derive(Debug)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
}

impl ScriptedSource {
    /// Build a script from individual reply lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = lines
            .into_iter()
            .map(|line| line.into())
            .filter(|line| !line.starts_with('#'))
            .map(|line| {
                if line == EXPIRE_DIRECTIVE {
                    Reply::Expired
                } else {
                    Reply::Text(line)
                }
            })
            .collect();
        Self {
            replies: Mutex::new(replies),
        }
    }

    /// Build a script from newline-separated text.
    pub fn from_text(script: &str) -> Self {
        Self::from_lines(script.lines())
    }

    /// Load a script file. A script with no replies at all would abandon
    /// the session on its first prompt, so it is rejected up front.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_text(&content);
        if source.remaining() == 0 {
            return Err(SourceError::Script(format!(
                "script has no replies: {}",
                path.display()
            )));
        }
        Ok(source)
    }

    /// Replies left in the script.
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ResponseSource for ScriptedSource {
    async fn next_reply(&self) -> Result<Reply, SourceError> {
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or(Reply::Closed))
    }
}

/// A prompt sink that discards everything. Pairs with [`ScriptedSource`]
/// in tests and headless runs.
pub struct NullSink;

#[async_trait]
impl PromptSink for NullSink {
    async fn present(&self, _prompt: &Prompt) -> Result<(), SourceError> {
        Ok(())
    }

    async fn feedback(&self, _feedback: &Feedback) -> Result<(), SourceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plays_back_in_order() {
        let source = ScriptedSource::from_lines(["apple", "truck"]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text("apple".into()));
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text("truck".into()));
        assert_eq!(source.next_reply().await.unwrap(), Reply::Closed);
        assert_eq!(source.next_reply().await.unwrap(), Reply::Closed);
    }

    #[tokio::test]
    async fn expire_directive_becomes_expired() {
        let source = ScriptedSource::from_text("cat\n<<expire>>\n");
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text("cat".into()));
        assert_eq!(source.next_reply().await.unwrap(), Reply::Expired);
    }

    #[tokio::test]
    async fn comments_are_dropped_blank_lines_are_kept() {
        let source = ScriptedSource::from_text("# warm-up\napple\n\ntruck");
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text("apple".into()));
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text(String::new()));
        assert_eq!(source.next_reply().await.unwrap(), Reply::Text("truck".into()));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.script");
        std::fs::write(&path, "apple\n<<expire>>\n").unwrap();

        let source = ScriptedSource::from_file(&path).unwrap();
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ScriptedSource::from_file(Path::new("/nonexistent/script")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn reply_free_script_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.script");
        std::fs::write(&path, "# only commentary\n").unwrap();

        let err = ScriptedSource::from_file(&path).unwrap_err();
        assert!(matches!(err, SourceError::Script(_)));
    }
}

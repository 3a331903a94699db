//! Administration history and word-list rotation.
//!
//! A subject who retakes the test with the same word list is partly
//! recalling the previous session, not learning. The history file records
//! every completed administration so `pick_version` can hand each subject
//! a list they have not seen, or failing that the one seen longest ago.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remindful_core::report::SessionReport;
use remindful_core::vocabulary::Vocabulary;

/// One completed administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrationRecord {
    #[serde(default)]
    pub subject: Option<String>,
    pub vocabulary_id: String,
    pub version: String,
    pub completed_at: DateTime<Utc>,
    pub total: u32,
    pub max_total: u32,
}

/// Every administration this installation has recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionHistory {
    #[serde(default)]
    pub administrations: Vec<AdministrationRecord>,
}

impl VersionHistory {
    /// Load history from disk; a missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse history: {}", path.display()))
    }

    /// Save history, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write history: {}", path.display()))?;
        Ok(())
    }

    /// Append the administration a report describes.
    pub fn record_administration(&mut self, report: &SessionReport) {
        self.administrations.push(AdministrationRecord {
            subject: report.subject.clone(),
            vocabulary_id: report.vocabulary.id.clone(),
            version: report.vocabulary.version.clone(),
            completed_at: report.created_at,
            total: report.scores.total,
            max_total: report.scores.max_total(),
        });
    }

    /// When `subject` last completed this exact vocabulary version.
    pub fn last_taken(
        &self,
        subject: Option<&str>,
        vocabulary_id: &str,
        version: &str,
    ) -> Option<DateTime<Utc>> {
        self.administrations
            .iter()
            .filter(|r| {
                r.subject.as_deref() == subject
                    && r.vocabulary_id == vocabulary_id
                    && r.version == version
            })
            .map(|r| r.completed_at)
            .max()
    }

    /// Which vocabulary `subject` should take next: the first version they
    /// have never taken (in list order), else the one taken longest ago.
    pub fn pick_version<'a>(
        &self,
        vocabularies: &'a [Vocabulary],
        subject: Option<&str>,
    ) -> Option<&'a Vocabulary> {
        if let Some(fresh) = vocabularies
            .iter()
            .find(|v| self.last_taken(subject, &v.id, &v.version).is_none())
        {
            return Some(fresh);
        }
        vocabularies
            .iter()
            .min_by_key(|v| self.last_taken(subject, &v.id, &v.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    use remindful_core::report::VocabularySummary;
    use remindful_core::scoring::Scores;
    use remindful_core::vocabulary::VocabularyItem;

    fn make_vocabulary(version: &str) -> Vocabulary {
        Vocabulary {
            id: "standard".into(),
            name: format!("Standard ({version})"),
            description: String::new(),
            version: version.into(),
            items: vec![VocabularyItem::new("fruit", "apple")],
            sheet_size: 4,
        }
    }

    fn make_report(subject: &str, version: &str, completed_at: DateTime<Utc>) -> SessionReport {
        SessionReport {
            id: Uuid::nil(),
            created_at: completed_at,
            subject: Some(subject.into()),
            vocabulary: VocabularySummary {
                id: "standard".into(),
                name: "Standard".into(),
                version: version.into(),
                item_count: 16,
                sheet_count: 4,
            },
            scores: Scores {
                immediate: 14,
                max_immediate: 16,
                free: 8,
                max_free: 16,
                cued: 5,
                max_cued: 8,
                intrusions: 1,
                total: 27,
            },
            sheets: vec![],
            transcript: vec![],
            missed: vec![],
            cued: vec![],
            interference_responses: vec![],
            duration_ms: 600_000,
        }
    }

    #[test]
    fn missing_file_is_empty_history() {
        let history = VersionHistory::load(Path::new("/nonexistent/history.json")).unwrap();
        assert!(history.administrations.is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = VersionHistory::default();
        history.record_administration(&make_report("mk", "list-a", Utc::now()));
        history.save(&path).unwrap();

        let loaded = VersionHistory::load(&path).unwrap();
        assert_eq!(loaded.administrations.len(), 1);
        assert_eq!(loaded.administrations[0].version, "list-a");
        assert_eq!(loaded.administrations[0].total, 27);
        assert_eq!(loaded.administrations[0].max_total, 40);
    }

    #[test]
    fn last_taken_distinguishes_subjects() {
        let mut history = VersionHistory::default();
        let when = Utc::now();
        history.record_administration(&make_report("mk", "list-a", when));

        assert_eq!(history.last_taken(Some("mk"), "standard", "list-a"), Some(when));
        assert!(history.last_taken(Some("aj"), "standard", "list-a").is_none());
        assert!(history.last_taken(None, "standard", "list-a").is_none());
    }

    #[test]
    fn pick_prefers_a_version_never_taken() {
        let vocabularies = vec![make_vocabulary("list-a"), make_vocabulary("list-b")];
        let mut history = VersionHistory::default();
        history.record_administration(&make_report("mk", "list-a", Utc::now()));

        let picked = history.pick_version(&vocabularies, Some("mk")).unwrap();
        assert_eq!(picked.version, "list-b");
    }

    #[test]
    fn pick_rotates_to_the_least_recent() {
        let vocabularies = vec![make_vocabulary("list-a"), make_vocabulary("list-b")];
        let mut history = VersionHistory::default();
        let now = Utc::now();
        history.record_administration(&make_report("mk", "list-a", now - Duration::days(30)));
        history.record_administration(&make_report("mk", "list-b", now - Duration::days(7)));

        let picked = history.pick_version(&vocabularies, Some("mk")).unwrap();
        assert_eq!(picked.version, "list-a");
    }

    #[test]
    fn pick_ignores_other_subjects() {
        let vocabularies = vec![make_vocabulary("list-a"), make_vocabulary("list-b")];
        let mut history = VersionHistory::default();
        history.record_administration(&make_report("aj", "list-a", Utc::now()));

        // mk has taken nothing; list order decides
        let picked = history.pick_version(&vocabularies, Some("mk")).unwrap();
        assert_eq!(picked.version, "list-a");
    }

    #[test]
    fn pick_from_empty_list_is_none() {
        let history = VersionHistory::default();
        assert!(history.pick_version(&[], Some("mk")).is_none());
    }
}

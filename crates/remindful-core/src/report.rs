//! Session report types with JSON persistence and longitudinal comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::immediate::RecallStatus;
use crate::scoring::Scores;
use crate::vocabulary::VocabularyItem;

/// A complete record of one administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the session finished.
    pub created_at: DateTime<Utc>,
    /// Who took the test, if recorded.
    pub subject: Option<String>,
    /// Summary of the word list used.
    pub vocabulary: VocabularySummary,
    /// Component scores with their maxima.
    pub scores: Scores,
    /// Per-sheet, per-item detail.
    pub sheets: Vec<SheetOutcome>,
    /// Everything the subject produced during free recall, in order.
    pub transcript: Vec<String>,
    /// The items free recall missed, in vocabulary order.
    pub missed: Vec<VocabularyItem>,
    /// What happened for each missed item during cued recall.
    pub cued: Vec<CuedOutcome>,
    /// Stimulus responses tallied during interference.
    pub interference_responses: Vec<String>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a word list (without the full item definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularySummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub item_count: usize,
    pub sheet_count: usize,
}

/// Detail for one sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub index: usize,
    pub items: Vec<ItemOutcome>,
}

/// Detail for one vocabulary item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub cue: String,
    pub target: String,
    /// Trials needed during controlled learning.
    pub learning_attempts: u32,
    /// Final immediate-recall status.
    pub recall: RecallStatus,
    /// Whether the reminder was consumed on the way there.
    pub reminded: bool,
}

/// How one missed item resolved during cued recall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuedOutcome {
    pub cue: String,
    pub target: String,
    pub response: String,
    pub result: CuedResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuedResult {
    /// The cue brought the word back.
    Correct,
    /// A wrong word was produced.
    Intrusion,
    /// An explicit "don't know".
    Skipped,
}

impl SessionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this administration against an earlier one.
    ///
    /// Components are compared as rates (score over maximum) so cued recall
    /// with different missed counts compares fairly. A drop beyond
    /// `threshold` is a decline, a rise beyond it an improvement.
    pub fn compare(&self, baseline: &SessionReport, threshold: f64) -> ChangeReport {
        let pairs = [
            ("immediate", baseline.scores.rate_immediate(), self.scores.rate_immediate()),
            ("free", baseline.scores.rate_free(), self.scores.rate_free()),
            ("cued", baseline.scores.rate_cued(), self.scores.rate_cued()),
            ("total", baseline.scores.rate_total(), self.scores.rate_total()),
        ];

        let mut declines = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;

        for (component, baseline_rate, current_rate) in pairs {
            let delta = current_rate - baseline_rate;
            if delta < -threshold {
                declines.push(ComponentChange {
                    component: component.to_string(),
                    baseline_rate,
                    current_rate,
                    delta,
                });
            } else if delta > threshold {
                improvements.push(ComponentChange {
                    component: component.to_string(),
                    baseline_rate,
                    current_rate,
                    delta,
                });
            } else {
                unchanged += 1;
            }
        }

        ChangeReport {
            declines,
            improvements,
            unchanged,
            different_versions: self.vocabulary.version != baseline.vocabulary.version,
        }
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Session report\n\n");
        if let Some(subject) = &self.subject {
            md.push_str(&format!("**Subject:** {subject}\n\n"));
        }
        md.push_str(&format!(
            "**Word list:** {} (version {}), {} items in {} sheets\n\n",
            self.vocabulary.name,
            self.vocabulary.version,
            self.vocabulary.item_count,
            self.vocabulary.sheet_count
        ));
        md.push_str(&format!(
            "**Date:** {}\n\n",
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        ));

        md.push_str("| Component | Score | Max |\n");
        md.push_str("|-----------|-------|-----|\n");
        md.push_str(&format!(
            "| Immediate recall | {} | {} |\n",
            self.scores.immediate, self.scores.max_immediate
        ));
        md.push_str(&format!(
            "| Free recall | {} | {} |\n",
            self.scores.free, self.scores.max_free
        ));
        md.push_str(&format!(
            "| Cued recall | {} | {} |\n",
            self.scores.cued, self.scores.max_cued
        ));
        md.push_str(&format!("| Intrusions | {} | - |\n", self.scores.intrusions));
        md.push_str(&format!(
            "| **Total** | **{}** | **{}** |\n\n",
            self.scores.total,
            self.scores.max_total()
        ));

        for sheet in &self.sheets {
            md.push_str(&format!("### Sheet {}\n\n", sheet.index + 1));
            md.push_str("| Cue | Target | Attempts | Recall | Reminded |\n");
            md.push_str("|-----|--------|----------|--------|----------|\n");
            for item in &sheet.items {
                md.push_str(&format!(
                    "| {} | {} | {} | {:?} | {} |\n",
                    item.cue,
                    item.target,
                    item.learning_attempts,
                    item.recall,
                    if item.reminded { "yes" } else { "no" }
                ));
            }
            md.push('\n');
        }

        if !self.transcript.is_empty() {
            md.push_str(&format!(
                "**Free recall transcript:** {}\n\n",
                self.transcript.join(", ")
            ));
        }

        if !self.cued.is_empty() {
            md.push_str("### Cued recall\n\n");
            md.push_str("| Cue | Target | Response | Result |\n");
            md.push_str("|-----|--------|----------|--------|\n");
            for outcome in &self.cued {
                md.push_str(&format!(
                    "| {} | {} | {} | {:?} |\n",
                    outcome.cue,
                    outcome.target,
                    if outcome.response.is_empty() {
                        "-"
                    } else {
                        &outcome.response
                    },
                    outcome.result
                ));
            }
            md.push('\n');
        }

        md
    }
}

impl Scores {
    fn rate(score: u32, max: u32) -> f64 {
        if max == 0 {
            1.0
        } else {
            f64::from(score) / f64::from(max)
        }
    }

    pub fn rate_immediate(&self) -> f64 {
        Self::rate(self.immediate, self.max_immediate)
    }

    pub fn rate_free(&self) -> f64 {
        Self::rate(self.free, self.max_free)
    }

    /// Rate 1.0 when nothing was missed: a vacuously perfect cued phase.
    pub fn rate_cued(&self) -> f64 {
        Self::rate(self.cued, self.max_cued)
    }

    pub fn rate_total(&self) -> f64 {
        Self::rate(self.total, self.max_total())
    }
}

/// Result of comparing two administrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Components whose rate dropped beyond the threshold.
    pub declines: Vec<ComponentChange>,
    /// Components whose rate rose beyond the threshold.
    pub improvements: Vec<ComponentChange>,
    /// Components with no significant change.
    pub unchanged: usize,
    /// The two reports used different word-list versions. Comparison is
    /// still valid on rates but worth flagging.
    pub different_versions: bool,
}

/// One component change between administrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentChange {
    pub component: String,
    pub baseline_rate: f64,
    pub current_rate: f64,
    pub delta: f64,
}

impl ChangeReport {
    /// Returns true if any component declined.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} declines, {} improvements, {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        if self.different_versions {
            md.push_str("_Note: the two administrations used different word-list versions._\n\n");
        }

        if !self.declines.is_empty() {
            md.push_str("### Declines\n\n");
            md.push_str("| Component | Baseline | Current | Delta |\n");
            md.push_str("|-----------|----------|---------|-------|\n");
            for change in &self.declines {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:.1}% |\n",
                    change.component,
                    change.baseline_rate * 100.0,
                    change.current_rate * 100.0,
                    change.delta * 100.0
                ));
            }
            md.push('\n');
        }

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            md.push_str("| Component | Baseline | Current | Delta |\n");
            md.push_str("|-----------|----------|---------|-------|\n");
            for change in &self.improvements {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | +{:.1}% |\n",
                    change.component,
                    change.baseline_rate * 100.0,
                    change.current_rate * 100.0,
                    change.delta * 100.0
                ));
            }
        }

        md
    }
}

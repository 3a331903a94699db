//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use remindful_core::immediate::RecallStatus;
use remindful_core::report::{CuedResult, SessionReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a session report.
pub fn generate_html(report: &SessionReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>remindful report · {}</title>\n",
        html_escape(&report.vocabulary.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    let subject = report.subject.as_deref().unwrap_or("(unnamed subject)");
    html.push_str("<header>\n");
    html.push_str("<h1>remindful report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Subject: <strong>{}</strong> | {} ({}) | {} | {}m {:02}s</p>\n",
        html_escape(subject),
        html_escape(&report.vocabulary.name),
        html_escape(&report.vocabulary.version),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration_ms / 60_000,
        (report.duration_ms / 1_000) % 60,
    ));
    html.push_str("</header>\n");

    // Score summary
    let scores = &report.scores;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Scores</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Component</th><th>Score</th><th>Max</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    html.push_str(&format!(
        "<tr><td>Immediate cued recall</td><td>{}</td><td>{}</td></tr>\n",
        scores.immediate, scores.max_immediate
    ));
    html.push_str(&format!(
        "<tr><td>Free recall</td><td>{}</td><td>{}</td></tr>\n",
        scores.free, scores.max_free
    ));
    html.push_str(&format!(
        "<tr><td>Cued recall of missed items</td><td>{}</td><td>{}</td></tr>\n",
        scores.cued, scores.max_cued
    ));
    html.push_str(&format!(
        "<tr><td>Intrusions</td><td>{}</td><td></td></tr>\n",
        scores.intrusions
    ));
    html.push_str(&format!(
        "<tr class=\"total\"><td>Total</td><td>{}</td><td>{}</td></tr>\n",
        scores.total,
        scores.max_total()
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-sheet outcomes
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Sheets</h2>\n");
    for sheet in &report.sheets {
        html.push_str(&format!("<h3>Sheet {}</h3>\n", sheet.index + 1));
        html.push_str("<table class=\"results-table\">\n");
        html.push_str(
            "<thead><tr><th>Cue</th><th>Word</th><th>Learning attempts</th><th>Recall</th><th>Reminded</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for item in &sheet.items {
            let (status_class, status_text) = match item.recall {
                RecallStatus::Correct => ("pass", "correct"),
                RecallStatus::Failed => ("fail", "failed"),
                RecallStatus::Reminded => ("remind", "reminded"),
                RecallStatus::Untested => ("", "untested"),
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
                html_escape(&item.cue),
                html_escape(&item.target),
                item.learning_attempts,
                status_class,
                status_text,
                if item.reminded { "yes" } else { "" },
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Free recall transcript
    html.push_str("<section class=\"transcript\">\n");
    html.push_str("<h2>Free recall</h2>\n");
    if report.transcript.is_empty() {
        html.push_str("<p class=\"meta\">Nothing recalled.</p>\n");
    } else {
        let tokens: Vec<String> = report.transcript.iter().map(|t| html_escape(t)).collect();
        html.push_str(&format!("<p>{}</p>\n", tokens.join(", ")));
    }
    html.push_str("</section>\n");

    // Cued recall of missed items
    if !report.cued.is_empty() {
        html.push_str("<section class=\"results\">\n");
        html.push_str("<h2>Cued recall of missed items</h2>\n");
        html.push_str("<table class=\"results-table\">\n");
        html.push_str(
            "<thead><tr><th>Cue</th><th>Word</th><th>Response</th><th>Result</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for outcome in &report.cued {
            let (class, text) = match outcome.result {
                CuedResult::Correct => ("pass", "recovered"),
                CuedResult::Intrusion => ("fail", "intrusion"),
                CuedResult::Skipped => ("", "skipped"),
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(&outcome.cue),
                html_escape(&outcome.target),
                html_escape(&outcome.response),
                class,
                text,
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Interference tally
    html.push_str("<section class=\"interference\">\n");
    html.push_str(&format!(
        "<h2>Interference</h2>\n<p class=\"meta\">{} responses</p>\n",
        report.interference_responses.len()
    ));
    if !report.interference_responses.is_empty() {
        let responses: Vec<String> = report
            .interference_responses
            .iter()
            .map(|r| html_escape(r))
            .collect();
        html.push_str(&format!(
            "<details>\n<summary>Responses</summary>\n<p>{}</p>\n</details>\n",
            responses.join(", ")
        ));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &SessionReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --remind: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --remind: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.remind { background: var(--remind); }
.total td { font-weight: bold; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use remindful_core::report::{
        CuedOutcome, ItemOutcome, SheetOutcome, VocabularySummary,
    };
    use remindful_core::scoring::Scores;
    use remindful_core::vocabulary::VocabularyItem;

    fn make_test_report() -> SessionReport {
        SessionReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            subject: Some("mk".into()),
            vocabulary: VocabularySummary {
                id: "standard".into(),
                name: "Standard vocabulary".into(),
                version: "list-a".into(),
                item_count: 4,
                sheet_count: 1,
            },
            scores: Scores {
                immediate: 4,
                max_immediate: 4,
                free: 2,
                max_free: 4,
                cued: 1,
                max_cued: 2,
                intrusions: 1,
                total: 7,
            },
            sheets: vec![SheetOutcome {
                index: 0,
                items: vec![
                    ItemOutcome {
                        cue: "fruit".into(),
                        target: "apple".into(),
                        learning_attempts: 1,
                        recall: RecallStatus::Correct,
                        reminded: false,
                    },
                    ItemOutcome {
                        cue: "vehicle".into(),
                        target: "truck".into(),
                        learning_attempts: 2,
                        recall: RecallStatus::Failed,
                        reminded: true,
                    },
                ],
            }],
            transcript: vec!["apple".into(), "couch".into()],
            missed: vec![
                VocabularyItem::new("vehicle", "truck"),
                VocabularyItem::new("animal", "dog"),
            ],
            cued: vec![
                CuedOutcome {
                    cue: "vehicle".into(),
                    target: "truck".into(),
                    response: "truck".into(),
                    result: CuedResult::Correct,
                },
                CuedOutcome {
                    cue: "animal".into(),
                    target: "dog".into(),
                    response: "cat".into(),
                    result: CuedResult::Intrusion,
                },
            ],
            interference_responses: vec!["cat".into(), "97".into()],
            duration_ms: 725_000,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Standard vocabulary"));
        assert!(html.contains("list-a"));
        assert!(html.contains("Sheet 1"));
        assert!(html.contains("intrusion"));
        assert!(html.contains("12m 05s"));
    }

    #[test]
    fn recall_statuses_get_css_classes() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("class=\"pass\">correct"));
        assert!(html.contains("class=\"fail\">failed"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut report = make_test_report();
        report.subject = Some("<script>alert(1)</script>".into());
        let html = generate_html(&report);

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}

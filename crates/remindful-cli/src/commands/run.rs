//! The `remindful run` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use remindful_core::matcher::MatchMode;
use remindful_core::parser;
use remindful_core::report::SessionReport;
use remindful_core::session::{Feedback, Phase};
use remindful_core::vocabulary::Vocabulary;
use remindful_report::csv::write_csv;
use remindful_report::html::write_html_report;
use remindful_runner::observer::SessionObserver;
use remindful_runner::SessionRunner;
use remindful_sources::config::load_config_from;
use remindful_sources::console::ConsoleInteraction;
use remindful_sources::history::VersionHistory;
use remindful_sources::scripted::{NullSink, ScriptedSource};

/// Administering-side progress log. The subject sees the prompt sink;
/// this goes to stderr for whoever is running the session.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_phase_change(&self, _from: Phase, to: Phase) {
        eprintln!("  Phase: {to}");
    }

    fn on_feedback(&self, _feedback: &Feedback) {}

    fn on_complete(&self, report: &SessionReport, elapsed: Duration) {
        eprintln!(
            "\nComplete: {}/{} recalled across all phases ({:.1}s)",
            report.scores.total,
            report.scores.max_total(),
            elapsed.as_secs_f64()
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    vocabulary_path: Option<PathBuf>,
    subject: Option<String>,
    script: Option<PathBuf>,
    matching: Option<String>,
    threshold: Option<u8>,
    interference_secs: Option<u64>,
    free_recall_secs: Option<u64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Load config, then fold the command line over it
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(subject) = subject {
        config.subject = Some(subject);
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(raw) = &matching {
        config.learning_matching.mode = raw.parse::<MatchMode>().map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(threshold) = threshold {
        anyhow::ensure!(
            (1..=100).contains(&threshold),
            "threshold must be between 1 and 100"
        );
        config.learning_matching.threshold = threshold;
    }
    if let Some(secs) = interference_secs {
        config.interference_secs = secs;
    }
    if let Some(secs) = free_recall_secs {
        config.free_recall_secs = secs;
    }

    let history_path = config.history_path();
    let mut history = VersionHistory::load(&history_path)?;

    let vocabulary = select_vocabulary(
        vocabulary_path.as_deref().unwrap_or(&config.vocabulary_dir),
        &history,
        config.subject.as_deref(),
    )?;

    tracing::info!(
        vocabulary = %vocabulary.id,
        version = %vocabulary.version,
        items = vocabulary.len(),
        "administering session"
    );

    let runner = match &script {
        Some(path) => SessionRunner::new(
            Arc::new(NullSink),
            Arc::new(ScriptedSource::from_file(path)?),
        ),
        None => {
            let console = Arc::new(ConsoleInteraction::new());
            SessionRunner::new(console.clone(), console)
        }
    };

    let report = runner
        .run(vocabulary, config.to_session_config(), &ConsoleObserver)
        .await?;

    print_summary(&report);

    // Save outputs
    std::fs::create_dir_all(&config.output_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "csv"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = config.output_dir.join(format!("session-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = config.output_dir.join(format!("session-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "csv" => {
                let path = config.output_dir.join("sessions.csv");
                write_csv(&report, &path)?;
                eprintln!("CSV row appended to: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    history.record_administration(&report);
    history.save(&history_path)?;

    Ok(())
}

/// A file is administered as-is; a directory is rotated through so the
/// subject gets a version they have not seen recently.
fn select_vocabulary(
    path: &Path,
    history: &VersionHistory,
    subject: Option<&str>,
) -> Result<Vocabulary> {
    if path.is_dir() {
        let vocabularies = parser::load_vocabulary_directory(path)?;
        anyhow::ensure!(
            !vocabularies.is_empty(),
            "no vocabulary files found in {}",
            path.display()
        );
        history
            .pick_version(&vocabularies, subject)
            .cloned()
            .context("no vocabulary available")
    } else {
        parser::parse_vocabulary(path)
    }
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Component", "Score", "Max"]);
    table.add_row(vec![
        Cell::new("Immediate recall"),
        Cell::new(report.scores.immediate),
        Cell::new(report.scores.max_immediate),
    ]);
    table.add_row(vec![
        Cell::new("Free recall"),
        Cell::new(report.scores.free),
        Cell::new(report.scores.max_free),
    ]);
    table.add_row(vec![
        Cell::new("Cued recall"),
        Cell::new(report.scores.cued),
        Cell::new(report.scores.max_cued),
    ]);
    table.add_row(vec![
        Cell::new("Intrusions"),
        Cell::new(report.scores.intrusions),
        Cell::new("-"),
    ]);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(report.scores.total),
        Cell::new(report.scores.max_total()),
    ]);

    eprintln!("\n{table}");
}

//! Longitudinal CSV export.
//!
//! One row per administration so successive sessions of the same subject
//! accumulate into a single spreadsheet-friendly file. Column order:
//! id, created_at, subject, vocabulary_id, version, immediate,
//! max_immediate, free, max_free, cued, max_cued, intrusions, total,
//! max_total, duration_ms.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use remindful_core::report::SessionReport;

/// Quote a CSV field when it needs it.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// The CSV header line, without a trailing newline.
pub fn csv_header() -> &'static str {
    "id,created_at,subject,vocabulary_id,version,immediate,max_immediate,\
     free,max_free,cued,max_cued,intrusions,total,max_total,duration_ms"
}

/// One report as a CSV line, without a trailing newline.
pub fn csv_row(report: &SessionReport) -> String {
    let scores = &report.scores;
    [
        report.id.to_string(),
        report.created_at.to_rfc3339(),
        escape_csv(report.subject.as_deref().unwrap_or("")),
        escape_csv(&report.vocabulary.id),
        escape_csv(&report.vocabulary.version),
        scores.immediate.to_string(),
        scores.max_immediate.to_string(),
        scores.free.to_string(),
        scores.max_free.to_string(),
        scores.cued.to_string(),
        scores.max_cued.to_string(),
        scores.intrusions.to_string(),
        scores.total.to_string(),
        scores.max_total().to_string(),
        report.duration_ms.to_string(),
    ]
    .join(",")
}

/// Append a report to a CSV file, writing the header first when the file
/// is new or empty.
pub fn write_csv(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open csv: {}", path.display()))?;

    if needs_header {
        writeln!(file, "{}", csv_header())?;
    }
    writeln!(file, "{}", csv_row(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use remindful_core::report::VocabularySummary;
    use remindful_core::scoring::Scores;

    fn make_test_report(subject: &str) -> SessionReport {
        SessionReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            subject: Some(subject.into()),
            vocabulary: VocabularySummary {
                id: "standard".into(),
                name: "Standard vocabulary".into(),
                version: "list-a".into(),
                item_count: 16,
                sheet_count: 4,
            },
            scores: Scores {
                immediate: 14,
                max_immediate: 16,
                free: 9,
                max_free: 16,
                cued: 5,
                max_cued: 7,
                intrusions: 2,
                total: 28,
            },
            sheets: vec![],
            transcript: vec![],
            missed: vec![],
            cued: vec![],
            interference_responses: vec![],
            duration_ms: 610_000,
        }
    }

    #[test]
    fn header_and_row_have_matching_arity() {
        let report = make_test_report("mk");
        let header_fields = csv_header().split(',').count();
        let row_fields = csv_row(&report).split(',').count();
        assert_eq!(header_fields, row_fields);
        assert_eq!(header_fields, 15);
    }

    #[test]
    fn row_carries_the_scores_in_order() {
        let report = make_test_report("mk");
        let row = csv_row(&report);
        assert!(row.contains(",14,16,9,16,5,7,2,28,39,610000"));
        assert!(row.contains(",mk,standard,list-a,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let report = make_test_report("Kovacs, M.");
        let row = csv_row(&report);
        assert!(row.contains("\"Kovacs, M.\""));
    }

    #[test]
    fn successive_writes_accumulate_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");

        write_csv(&make_test_report("mk"), &path).unwrap();
        write_csv(&make_test_report("aj"), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], csv_header());
        assert!(lines[1].contains("mk"));
        assert!(lines[2].contains("aj"));
    }
}

//! The `remindful compare` command.

use std::path::PathBuf;

use anyhow::Result;

use remindful_core::report::SessionReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let baseline = SessionReport::load_json(&baseline_path)?;
    let current = SessionReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                report.declines.len(),
                report.improvements.len(),
                report.unchanged
            );

            if report.different_versions {
                println!("Note: the administrations used different word-list versions.");
            }

            if !report.declines.is_empty() {
                println!("\nDeclines:");
                for d in &report.declines {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        d.component,
                        d.baseline_rate * 100.0,
                        d.current_rate * 100.0,
                        d.delta * 100.0
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.1}% -> {:.1}% (+{:.1}%)",
                        i.component,
                        i.baseline_rate * 100.0,
                        i.current_rate * 100.0,
                        i.delta * 100.0
                    );
                }
            }
        }
    }

    if fail_on_decline && report.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}

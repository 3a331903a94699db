//! The `remindful versions` command.

use std::path::PathBuf;

use anyhow::Result;

use remindful_sources::config::load_config_from;
use remindful_sources::history::VersionHistory;

pub fn execute(subject: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = VersionHistory::load(&config.history_path())?;
    let subject = subject.or_else(|| config.subject.clone());

    if !config.vocabulary_dir.is_dir() {
        println!(
            "No vocabulary directory at {}. Run `remindful init` to create one.",
            config.vocabulary_dir.display()
        );
        return Ok(());
    }

    let vocabularies = remindful_core::parser::load_vocabulary_directory(&config.vocabulary_dir)?;
    if vocabularies.is_empty() {
        println!(
            "No vocabulary files in {}. Run `remindful init` to create one.",
            config.vocabulary_dir.display()
        );
        return Ok(());
    }

    match &subject {
        Some(s) => println!("Rotation for subject: {s}"),
        None => println!("Rotation for anonymous administrations"),
    }

    let next = history.pick_version(&vocabularies, subject.as_deref());

    for vocabulary in &vocabularies {
        let taken = history.last_taken(subject.as_deref(), &vocabulary.id, &vocabulary.version);
        let marker = match next {
            Some(n) if n.id == vocabulary.id && n.version == vocabulary.version => "  <- next",
            _ => "",
        };
        println!(
            "  {} [{}] {} items, last taken: {}{}",
            vocabulary.id,
            vocabulary.version,
            vocabulary.len(),
            taken
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "never".to_string()),
            marker
        );
    }

    Ok(())
}

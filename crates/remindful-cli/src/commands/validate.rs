//! The `remindful validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(vocabulary_path: PathBuf) -> Result<()> {
    let vocabularies = if vocabulary_path.is_dir() {
        remindful_core::parser::load_vocabulary_directory(&vocabulary_path)?
    } else {
        vec![remindful_core::parser::parse_vocabulary(&vocabulary_path)?]
    };

    let mut total_warnings = 0;

    for vocabulary in &vocabularies {
        let sheet_count = if vocabulary.sheet_size == 0 {
            0
        } else {
            vocabulary.sheets().len()
        };
        println!(
            "Vocabulary: {} [{}] ({} items in {} sheets)",
            vocabulary.name,
            vocabulary.version,
            vocabulary.len(),
            sheet_count
        );

        let warnings = remindful_core::parser::validate_vocabulary(vocabulary);
        for w in &warnings {
            let prefix = w
                .cue
                .as_ref()
                .map(|cue| format!("  [{cue}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All vocabularies valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

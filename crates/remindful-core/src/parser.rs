//! TOML vocabulary parser.
//!
//! Loads cue/target vocabularies from TOML files and directories, and
//! validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::vocabulary::{Vocabulary, VocabularyItem};

/// Intermediate TOML structure for parsing vocabulary files.
#[derive(Debug, Deserialize)]
struct TomlVocabularyFile {
    vocabulary: TomlVocabularyHeader,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlVocabularyHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default = "default_sheet_size")]
    sheet_size: usize,
}

fn default_version() -> String {
    "list-a".to_string()
}

fn default_sheet_size() -> usize {
    4
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    cue: String,
    target: String,
}

/// Parse a single TOML file into a `Vocabulary`.
pub fn parse_vocabulary(path: &Path) -> Result<Vocabulary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read vocabulary file: {}", path.display()))?;

    parse_vocabulary_str(&content, path)
}

/// Parse a TOML string into a `Vocabulary` (useful for testing).
pub fn parse_vocabulary_str(content: &str, source_path: &Path) -> Result<Vocabulary> {
    let parsed: TomlVocabularyFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let items = parsed
        .items
        .into_iter()
        .map(|i| VocabularyItem {
            cue: i.cue,
            target: i.target,
        })
        .collect();

    Ok(Vocabulary {
        id: parsed.vocabulary.id,
        name: parsed.vocabulary.name,
        description: parsed.vocabulary.description,
        version: parsed.vocabulary.version,
        items,
        sheet_size: parsed.vocabulary.sheet_size,
    })
}

/// Recursively load all `.toml` vocabulary files from a directory.
///
/// Results are sorted by id then version so listings and version rotation
/// do not depend on directory iteration order.
pub fn load_vocabulary_directory(dir: &Path) -> Result<Vec<Vocabulary>> {
    let mut vocabularies = collect_vocabularies(dir)?;
    vocabularies.sort_by(|a, b| (&a.id, &a.version).cmp(&(&b.id, &b.version)));
    Ok(vocabularies)
}

fn collect_vocabularies(dir: &Path) -> Result<Vec<Vocabulary>> {
    let mut vocabularies = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            vocabularies.extend(collect_vocabularies(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_vocabulary(&path) {
                Ok(vocabulary) => vocabularies.push(vocabulary),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(vocabularies)
}

/// A warning from vocabulary validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The cue of the offending item (if applicable).
    pub cue: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a vocabulary for common issues.
///
/// Everything here is a warning; the fatal subset (blank fields, duplicate
/// cues, no items) is re-checked when a session is created.
pub fn validate_vocabulary(vocabulary: &Vocabulary) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if vocabulary.is_empty() {
        warnings.push(ValidationWarning {
            cue: None,
            message: "vocabulary has no items".into(),
        });
    }

    if vocabulary.description.trim().is_empty() {
        warnings.push(ValidationWarning {
            cue: None,
            message: "vocabulary has no description".into(),
        });
    }

    // Check for blank cues or targets
    for item in &vocabulary.items {
        if item.cue.trim().is_empty() {
            warnings.push(ValidationWarning {
                cue: None,
                message: "item has a blank cue".into(),
            });
        }
        if item.target.trim().is_empty() {
            warnings.push(ValidationWarning {
                cue: Some(item.cue.clone()),
                message: format!("blank target for cue: {}", item.cue),
            });
        }
        if !item.cue.trim().is_empty()
            && item.cue.trim().to_lowercase() == item.target.trim().to_lowercase()
        {
            warnings.push(ValidationWarning {
                cue: Some(item.cue.clone()),
                message: format!("cue and target are the same word: {}", item.cue),
            });
        }
    }

    // Check for duplicate cues
    let mut seen_cues = std::collections::HashSet::new();
    for item in &vocabulary.items {
        if !seen_cues.insert(item.cue.to_lowercase()) {
            warnings.push(ValidationWarning {
                cue: Some(item.cue.clone()),
                message: format!("duplicate cue: {}", item.cue),
            });
        }
    }

    // Duplicate targets make free recall ambiguous: one spoken word would
    // credit every item that carries it
    let mut seen_targets = std::collections::HashSet::new();
    for item in &vocabulary.items {
        if !seen_targets.insert(item.target.to_lowercase()) {
            warnings.push(ValidationWarning {
                cue: Some(item.cue.clone()),
                message: format!("duplicate target: {}", item.target),
            });
        }
    }

    if vocabulary.sheet_size == 0 {
        warnings.push(ValidationWarning {
            cue: None,
            message: "sheet_size must be at least 1".into(),
        });
    }

    // Check for a short final sheet
    if vocabulary.sheet_size > 0 && !vocabulary.items.is_empty() {
        let remainder = vocabulary.items.len() % vocabulary.sheet_size;
        if remainder != 0 {
            warnings.push(ValidationWarning {
                cue: None,
                message: format!(
                    "{} items do not fill sheets of {}; the last sheet has {}",
                    vocabulary.items.len(),
                    vocabulary.sheet_size,
                    remainder
                ),
            });
        }
    }

    // The standard form uses 16 items
    if !vocabulary.items.is_empty() && vocabulary.items.len() != 16 {
        warnings.push(ValidationWarning {
            cue: None,
            message: format!(
                "vocabulary has {} items; the standard form has 16",
                vocabulary.items.len()
            ),
        });
    }

    warnings
}

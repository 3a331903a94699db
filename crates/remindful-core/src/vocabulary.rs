//! Vocabulary types: cue/target pairs, word-list versions, and sheet
//! partitioning.
//!
//! A vocabulary is an ordered list of semantic-category cues paired with the
//! words to be learned. The canonical clinical form is 16 items taught in
//! sheets of 4, but both counts are data carried by the vocabulary itself.

use serde::{Deserialize, Serialize};

/// Item count of the canonical clinical vocabulary.
pub const STANDARD_ITEM_COUNT: usize = 16;

/// Sheet size of the canonical clinical vocabulary.
pub const STANDARD_SHEET_SIZE: usize = 4;

/// A single cue/target pair, e.g. `fruit` / `apple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Semantic-category cue presented to the subject.
    pub cue: String,
    /// The word to be learned and later recalled.
    pub target: String,
}

impl VocabularyItem {
    pub fn new(cue: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            cue: cue.into(),
            target: target.into(),
        }
    }
}

/// An ordered word list for one test version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Unique identifier for this word list.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this word list.
    #[serde(default)]
    pub description: String,
    /// Version key used for rotation across repeat administrations.
    pub version: String,
    /// The cue/target pairs, in presentation order.
    #[serde(default)]
    pub items: Vec<VocabularyItem>,
    /// How many items are taught per sheet.
    #[serde(default = "default_sheet_size")]
    pub sheet_size: usize,
}

fn default_sheet_size() -> usize {
    STANDARD_SHEET_SIZE
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The target paired with `cue`, if the cue exists.
    pub fn target(&self, cue: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.cue == cue)
            .map(|item| item.target.as_str())
    }

    /// Partition the items into sheets by this vocabulary's `sheet_size`.
    pub fn sheets(&self) -> Vec<Sheet> {
        partition(&self.items, self.sheet_size)
    }
}

/// One group of consecutively taught items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    /// Zero-based position of this sheet in the vocabulary.
    pub index: usize,
    /// The items on this sheet, in vocabulary order.
    pub items: Vec<VocabularyItem>,
}

impl Sheet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The targets on this sheet, in order. Shown as the choice list while
    /// the sheet is being learned.
    pub fn targets(&self) -> Vec<String> {
        self.items.iter().map(|item| item.target.clone()).collect()
    }
}

/// Split `items` into consecutive sheets of `sheet_size`, preserving order.
/// The final sheet may be short. `sheet_size` must be at least 1.
pub fn partition(items: &[VocabularyItem], sheet_size: usize) -> Vec<Sheet> {
    assert!(sheet_size >= 1, "sheet_size must be at least 1");
    items
        .chunks(sheet_size)
        .enumerate()
        .map(|(index, chunk)| Sheet {
            index,
            items: chunk.to_vec(),
        })
        .collect()
}

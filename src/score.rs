//! # Notation Document Types
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── Metadata (title, composer)
//!   └── Vec<Part> (id P1, P2, ...; name)
//!         └── Vec<Measure>
//!               ├── number (1-based)
//!               ├── Attributes (divisions, fifths, time, clef)
//!               ├── divisions: length of the measure in divisions
//!               └── Vec<MeasureElement>
//!                     ├── Forward(divisions)
//!                     ├── Backup(divisions)
//!                     └── Note(Fragment) - pitched note or rest
//! ```
//!
//! Measures are built by the encoder and never modified afterwards.

use serde::Deserialize;

use crate::attributes::Attributes;
use crate::fragment::Fragment;

/// Document metadata from the input's `metadata` block
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    pub title: Option<String>,
    pub composer: Option<String>,
}

/// An element in a measure, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureElement {
    /// Move the measure cursor ahead without sounding
    Forward(u32),
    /// Move the measure cursor back to start another voice
    Backup(u32),
    Note(Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub number: usize,
    pub attributes: Attributes,
    /// Length of the measure in divisions
    pub divisions: u32,
    pub elements: Vec<MeasureElement>,
}

impl Measure {
    /// Notes and rests, skipping forward/backup markers
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.elements.iter().filter_map(|e| match e {
            MeasureElement::Note(fragment) => Some(fragment),
            _ => None,
        })
    }

    /// Number of forward and backup markers
    pub fn marker_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| !matches!(e, MeasureElement::Note(_)))
            .count()
    }
}

/// One instrument's line of measures
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: String,
    pub name: String,
    pub measures: Vec<Measure>,
}

/// A complete notation document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub metadata: Metadata,
    pub parts: Vec<Part>,
}

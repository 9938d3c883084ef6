//! Outline structure
//!
//! Chapters resolve to sections, sections hold items, items join to the
//! question repository through their composite key.
//!
//! Key components:
//! - `parser` - raw chapter text to sections
//! - `synth` - outline reconstruction from repository keys
//! - `loader` - memoized chapter resolution with fallback

pub mod loader;
pub mod parser;
pub mod synth;

pub use loader::{ChapterLoader, ChapterOutline, OutlineOrigin};

use serde::Serialize;

use crate::key::{self, CompositeKey};

/// A section within a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Display title as it appeared in the source
    pub raw_title: String,
    /// Numeral extracted from the title, `"0"` when absent
    pub section_key: String,
    pub items: Vec<Item>,
}

/// A single study item within a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub label: String,
    pub key: CompositeKey,
}

impl Item {
    /// Build an item from its label, resolving the join key within the
    /// chapter/section context
    pub fn resolve(chapter_key: &str, section_key: &str, label: impl Into<String>) -> Self {
        let label = label.into();
        let key = key::resolve_item_key(chapter_key, section_key, &label);
        Self { label, key }
    }
}

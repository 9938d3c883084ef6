//! Flattened full-text search over the corpus
//!
//! Every section and item becomes one searchable record holding its titles
//! and all reachable question text. Matching is deterministic substring
//! containment with count-based ranking; there is no stemming and no
//! inverted index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::bank::QuestionBank;
use crate::catalog::ChapterCatalog;
use crate::key::CompositeKey;
use crate::outline::ChapterOutline;
use crate::text;

/// What a search entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Section,
    Item,
}

/// One searchable record with the indices needed to navigate back to it
#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub kind: EntryKind,
    pub chapter_key: String,
    pub chapter_title: String,
    pub section_key: String,
    pub section_index: usize,
    pub section_title: String,
    /// Item entries only
    pub item_label: Option<String>,
    pub item_index: Option<usize>,
    pub item_key: Option<CompositeKey>,
    pub question_count: u32,
    /// Lowercased haystack: titles plus reachable question text
    #[serde(skip)]
    search_text: String,
}

impl SearchEntry {
    /// Most specific display label, used for tie-breaking
    pub fn label(&self) -> &str {
        match self.item_label.as_deref() {
            Some(label) => label,
            None if !self.section_title.is_empty() => &self.section_title,
            None => &self.chapter_title,
        }
    }
}

/// Corpus-wide search index, rebuilt wholesale on corpus reload
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    applied_concepts: HashSet<CompositeKey>,
}

impl SearchIndex {
    /// Flatten every section and item of every loaded chapter
    pub fn build(
        catalog: &ChapterCatalog,
        outlines: &HashMap<String, Arc<ChapterOutline>>,
        bank: &QuestionBank,
    ) -> Self {
        let mut entries = Vec::new();

        for chapter in catalog.iter() {
            let Some(outline) = outlines.get(&chapter.number) else {
                continue;
            };
            for (section_index, section) in outline.sections.iter().enumerate() {
                let mut section_text =
                    format!("{} {}", chapter.title, section.raw_title).to_lowercase();
                let mut section_count = 0u32;
                let mut item_entries = Vec::with_capacity(section.items.len());

                for (item_index, item) in section.items.iter().enumerate() {
                    let questions = bank.questions_for(&item.key);
                    let mut question_text = String::new();
                    for question in questions {
                        question_text.push(' ');
                        question_text.push_str(&text::strip_markup(&question.question_text));
                        question_text.push(' ');
                        question_text.push_str(&text::strip_markup(&question.options_html));
                    }
                    let question_text = question_text.to_lowercase();
                    section_text.push_str(&question_text);
                    section_count += questions.len() as u32;

                    let mut search_text = format!(
                        "{} {} {}",
                        chapter.title, section.raw_title, item.label
                    )
                    .to_lowercase();
                    search_text.push_str(&question_text);

                    item_entries.push(SearchEntry {
                        kind: EntryKind::Item,
                        chapter_key: chapter.number.clone(),
                        chapter_title: chapter.title.clone(),
                        section_key: section.section_key.clone(),
                        section_index,
                        section_title: section.raw_title.clone(),
                        item_label: Some(item.label.clone()),
                        item_index: Some(item_index),
                        item_key: Some(item.key.clone()),
                        question_count: questions.len() as u32,
                        search_text,
                    });
                }

                entries.push(SearchEntry {
                    kind: EntryKind::Section,
                    chapter_key: chapter.number.clone(),
                    chapter_title: chapter.title.clone(),
                    section_key: section.section_key.clone(),
                    section_index,
                    section_title: section.raw_title.clone(),
                    item_label: None,
                    item_index: None,
                    item_key: None,
                    question_count: section_count,
                    search_text: section_text,
                });
                entries.append(&mut item_entries);
            }
        }

        Self {
            entries,
            applied_concepts: HashSet::new(),
        }
    }

    /// Substring query, ranked by question count descending with the most
    /// specific label as tiebreak. Empty or whitespace-only input returns
    /// no results.
    pub fn query(&self, text: &str) -> Vec<&SearchEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<&SearchEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.search_text.contains(&needle))
            .collect();
        hits.sort_by(|a, b| {
            b.question_count
                .cmp(&a.question_count)
                .then_with(|| a.label().cmp(b.label()))
        });
        hits
    }

    /// Fold late-arriving concept text into every entry for an item key.
    ///
    /// The only permitted post-build mutation. Idempotent: a key's text is
    /// appended at most once, no matter how often the concept resolves.
    /// Returns whether anything changed.
    pub fn append_concept_text(&mut self, key: &CompositeKey, concept: &str) -> bool {
        if !self.applied_concepts.insert(key.clone()) {
            return false;
        }
        let addition = text::strip_markup(concept).to_lowercase();
        if addition.is_empty() {
            return false;
        }
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.item_key.as_ref() == Some(key))
        {
            entry.search_text.push(' ');
            entry.search_text.push_str(&addition);
        }
        true
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

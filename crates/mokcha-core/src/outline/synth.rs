//! Outline reconstruction from repository keys
//!
//! When a chapter has no source text (or the fetch fails), an approximate
//! outline is rebuilt from the question bank's keys so every question stays
//! reachable through some node.

use std::collections::HashMap;

use crate::bank::QuestionBank;
use crate::key::CompositeKey;

use super::{Item, Section};

/// Reconstruct sections for a chapter from the bank's composite keys.
///
/// Keys are grouped by section component; sections and items are ordered by
/// the numeric value of their component (non-numeric sorts as 0), with the
/// key string as a deterministic tiebreak. Item labels prefer the first
/// associated question's stored label, falling back to `"<c>.<s>.<i>"`.
pub fn synthesize(chapter_key: &str, bank: &QuestionBank) -> Vec<Section> {
    let mut groups: HashMap<String, Vec<CompositeKey>> = HashMap::new();
    for key in bank.keys() {
        if key.chapter() != chapter_key {
            continue;
        }
        groups
            .entry(key.section().to_string())
            .or_default()
            .push(key.clone());
    }

    let mut section_keys: Vec<String> = groups.keys().cloned().collect();
    section_keys.sort_by(|a, b| numeric(a).cmp(&numeric(b)).then_with(|| a.cmp(b)));

    section_keys
        .into_iter()
        .map(|section_key| {
            let mut keys = groups.remove(&section_key).unwrap_or_default();
            keys.sort_by(|a, b| {
                numeric(a.item())
                    .cmp(&numeric(b.item()))
                    .then_with(|| a.cmp(b))
            });

            let items = keys
                .into_iter()
                .map(|key| Item {
                    label: item_label(&key, bank),
                    key,
                })
                .collect();

            Section {
                raw_title: format!("{section_key}절"),
                section_key,
                items,
            }
        })
        .collect()
}

fn item_label(key: &CompositeKey, bank: &QuestionBank) -> String {
    let stored = bank
        .questions_for(key)
        .first()
        .map(|q| q.item_key.trim())
        .unwrap_or("");
    if stored.is_empty() {
        format!("{}.{}.{}", key.chapter(), key.section(), key.item())
    } else {
        stored.to_string()
    }
}

fn numeric(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

//! Composite key derivation
//!
//! Outline items join to the question repository through a three-part key
//! derived from the decimal-digit runs in their display label.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches one run of decimal digits
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// The three numeric components extracted from an item label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts {
    pub chapter: String,
    pub section: String,
    pub item: String,
}

impl KeyParts {
    /// Render the parts as a join key
    pub fn composite(&self) -> CompositeKey {
        CompositeKey::from_parts(&self.chapter, &self.section, &self.item)
    }
}

/// Derive chapter/section/item parts from an item label.
///
/// Takes the first three digit runs, left to right; missing runs default to
/// `"0"`. Malformed labels degrade silently, so labels with fewer than three
/// runs collapse onto shared default parts.
pub fn derive_parts(label: &str) -> KeyParts {
    let mut runs = DIGIT_RUN.find_iter(label).map(|m| m.as_str().to_string());
    KeyParts {
        chapter: runs.next().unwrap_or_else(|| "0".to_string()),
        section: runs.next().unwrap_or_else(|| "0".to_string()),
        item: runs.next().unwrap_or_else(|| "0".to_string()),
    }
}

/// Resolve an item's join key within its chapter and section context.
///
/// Labels carrying a full `C.S.I` numbering keep their own three runs.
/// Shorter labels fall back to the surrounding chapter and section keys,
/// with the label's first run (else `"0"`) as the item part.
pub fn resolve_item_key(chapter: &str, section: &str, label: &str) -> CompositeKey {
    let runs: Vec<&str> = DIGIT_RUN.find_iter(label).map(|m| m.as_str()).collect();
    if runs.len() >= 3 {
        CompositeKey::from_parts(runs[0], runs[1], runs[2])
    } else {
        CompositeKey::from_parts(chapter, section, runs.first().copied().unwrap_or("0"))
    }
}

/// Join key between outline items and the question repository,
/// format `"<chapter> | <section> | <item>"`.
///
/// Not guaranteed unique: distinct malformed labels can share a key, and
/// their question counts merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Wrap a raw key string as stored in the question repository
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_parts(chapter: &str, section: &str, item: &str) -> Self {
        Self(format!("{chapter} | {section} | {item}"))
    }

    /// Key derived purely from a label's digit runs
    pub fn from_label(label: &str) -> Self {
        derive_parts(label).composite()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chapter(&self) -> &str {
        self.part(0)
    }

    pub fn section(&self) -> &str {
        self.part(1)
    }

    pub fn item(&self) -> &str {
        self.part(2)
    }

    fn part(&self, idx: usize) -> &str {
        self.0.split('|').nth(idx).map(str::trim).unwrap_or("0")
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_label_yields_its_three_runs() {
        let parts = derive_parts("3.1.2 소아과학의 정의");
        assert_eq!(parts.chapter, "3");
        assert_eq!(parts.section, "1");
        assert_eq!(parts.item, "2");
        assert_eq!(parts.composite().as_str(), "3 | 1 | 2");
    }

    #[test]
    fn test_missing_runs_default_to_zero() {
        // single run: first slot filled, rest default
        let parts = derive_parts("알레르기 2");
        assert_eq!(
            (parts.chapter.as_str(), parts.section.as_str(), parts.item.as_str()),
            ("2", "0", "0")
        );

        let parts = derive_parts("서론");
        assert_eq!(
            (parts.chapter.as_str(), parts.section.as_str(), parts.item.as_str()),
            ("0", "0", "0")
        );
    }

    #[test]
    fn test_always_three_parts_each_a_run_or_zero() {
        for label in ["", "abc", "1", "1.2", "1.2.3", "1.2.3.4.5", "x9y88z777w6666"] {
            let parts = derive_parts(label);
            for part in [&parts.chapter, &parts.section, &parts.item] {
                assert!(
                    part == "0" || (part.chars().all(|c| c.is_ascii_digit()) && label.contains(part.as_str())),
                    "bad part {part:?} for label {label:?}"
                );
            }
        }
    }

    #[test]
    fn test_runs_beyond_the_third_are_ignored() {
        assert_eq!(derive_parts("1.2.3.4").composite().as_str(), "1 | 2 | 3");
    }

    #[test]
    fn test_short_labels_collapse_onto_shared_keys() {
        // known ambiguity: unrelated labels without three runs share a key
        assert_eq!(
            derive_parts("서론").composite(),
            derive_parts("결론").composite()
        );
        assert_eq!(derive_parts("서론").composite().as_str(), "0 | 0 | 0");
    }

    #[test]
    fn test_resolve_item_key_uses_context_for_short_labels() {
        assert_eq!(resolve_item_key("3", "1", "1. 개요").as_str(), "3 | 1 | 1");
        assert_eq!(resolve_item_key("3", "1", "개요").as_str(), "3 | 1 | 0");
    }

    #[test]
    fn test_resolve_item_key_prefers_full_numbering() {
        // a fully numbered label wins over the surrounding context
        assert_eq!(resolve_item_key("9", "9", "3.1.2 정의").as_str(), "3 | 1 | 2");
    }

    #[test]
    fn test_composite_key_parts() {
        let key = CompositeKey::new("17 | 2 | 4");
        assert_eq!(key.chapter(), "17");
        assert_eq!(key.section(), "2");
        assert_eq!(key.item(), "4");
        assert_eq!(key.to_string(), "17 | 2 | 4");
    }
}

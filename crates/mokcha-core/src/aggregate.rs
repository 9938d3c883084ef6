//! Per-node question aggregation
//!
//! One pass over the bank produces year-by-year breakdowns for every
//! chapter, section, and item, plus a global bucket. Known nodes without
//! questions are backfilled with zero-valued breakdowns carrying every
//! corpus year, so all nodes render the same year columns. Lookups after
//! the build are O(1).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::bank::{Question, QuestionBank};
use crate::catalog::ChapterCatalog;
use crate::key::CompositeKey;
use crate::outline::ChapterOutline;

/// Per-year-plus-total question counts for one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub per_year: BTreeMap<String, u32>,
    pub total: u32,
}

impl Breakdown {
    /// Zero-valued breakdown carrying an entry for every known year
    pub fn zeroed(years: &[String]) -> Self {
        Self {
            per_year: years.iter().map(|y| (y.clone(), 0)).collect(),
            total: 0,
        }
    }

    /// Breakdown over a question list, zero-backfilled for `years`
    pub fn over<'a, I>(questions: I, years: &[String]) -> Self
    where
        I: IntoIterator<Item = &'a Question>,
    {
        let mut breakdown = Self::zeroed(years);
        for question in questions {
            breakdown.record(question);
        }
        breakdown
    }

    /// Count for a single year, zero when absent
    pub fn for_year(&self, year: &str) -> u32 {
        self.per_year.get(year).copied().unwrap_or(0)
    }

    fn record(&mut self, question: &Question) {
        *self.per_year.entry(question.year().to_string()).or_insert(0) += 1;
        self.total += 1;
    }
}

/// O(1) breakdown lookups by chapter, section, item, and globally
pub struct AggregationIndex {
    years: Vec<String>,
    global: Breakdown,
    by_chapter: HashMap<String, Breakdown>,
    by_section: HashMap<(String, String), Breakdown>,
    by_item: HashMap<CompositeKey, Breakdown>,
}

impl AggregationIndex {
    /// Build all buckets in one pass over the bank.
    ///
    /// Chapter and section buckets are keyed by the question key's own
    /// parts, so questions whose key matches no outline item still count
    /// there and globally; only item buckets require a known outline item.
    pub fn build(
        catalog: &ChapterCatalog,
        outlines: &HashMap<String, Arc<ChapterOutline>>,
        bank: &QuestionBank,
    ) -> Self {
        let years = bank.all_years();

        let mut by_chapter = HashMap::new();
        let mut by_section = HashMap::new();
        let mut by_item = HashMap::new();

        // register every known node up front so empty ones resolve to zeroes
        for chapter in catalog.iter() {
            by_chapter.insert(chapter.number.clone(), Breakdown::zeroed(&years));
            let Some(outline) = outlines.get(&chapter.number) else {
                continue;
            };
            for section in &outline.sections {
                by_section.insert(
                    (chapter.number.clone(), section.section_key.clone()),
                    Breakdown::zeroed(&years),
                );
                for item in &section.items {
                    by_item
                        .entry(item.key.clone())
                        .or_insert_with(|| Breakdown::zeroed(&years));
                }
            }
        }

        let mut global = Breakdown::zeroed(&years);
        for (key, questions) in bank.iter() {
            for question in questions {
                global.record(question);
                by_chapter
                    .entry(key.chapter().to_string())
                    .or_insert_with(|| Breakdown::zeroed(&years))
                    .record(question);
                by_section
                    .entry((key.chapter().to_string(), key.section().to_string()))
                    .or_insert_with(|| Breakdown::zeroed(&years))
                    .record(question);
                if let Some(breakdown) = by_item.get_mut(key) {
                    breakdown.record(question);
                }
            }
        }

        Self {
            years,
            global,
            by_chapter,
            by_section,
            by_item,
        }
    }

    /// Every year observed in the corpus, ascending
    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn global(&self) -> &Breakdown {
        &self.global
    }

    pub fn chapter(&self, number: &str) -> Option<&Breakdown> {
        self.by_chapter.get(number)
    }

    pub fn section(&self, number: &str, section_key: &str) -> Option<&Breakdown> {
        self.by_section
            .get(&(number.to_string(), section_key.to_string()))
    }

    pub fn item(&self, key: &CompositeKey) -> Option<&Breakdown> {
        self.by_item.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Chapter;
    use crate::outline::{parser, OutlineOrigin};

    fn fixture() -> (ChapterCatalog, HashMap<String, Arc<ChapterOutline>>, QuestionBank) {
        let catalog = ChapterCatalog::new(vec![Chapter {
            number: "3".to_string(),
            title: "3장 성장과 발달".to_string(),
            source: Some("3장 성장과 발달.md".to_string()),
        }]);

        let outline = ChapterOutline {
            sections: parser::parse("3", "# 1절 서론\n- 1. 개요\n- 2. 역사"),
            origin: OutlineOrigin::Parsed,
        };
        let outlines = HashMap::from([("3".to_string(), Arc::new(outline))]);

        let bank = QuestionBank::from_json_str(
            r#"{
                "3 | 1 | 1": [
                    {"id": "2021-12", "question_text": "첫 문제"},
                    {"id": "2023-03", "question_text": "둘째 문제"}
                ],
                "3 | 1 | 2": []
            }"#,
        )
        .unwrap();

        (catalog, outlines, bank)
    }

    #[test]
    fn test_item_section_and_chapter_counts() {
        let (catalog, outlines, bank) = fixture();
        let index = AggregationIndex::build(&catalog, &outlines, &bank);

        let first = index.item(&CompositeKey::new("3 | 1 | 1")).unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(first.for_year("2021"), 1);
        assert_eq!(first.for_year("2023"), 1);

        // the empty sibling is known and zero-backfilled for both years
        let second = index.item(&CompositeKey::new("3 | 1 | 2")).unwrap();
        assert_eq!(second.total, 0);
        assert_eq!(second.per_year.len(), 2);
        assert_eq!(second.for_year("2021"), 0);

        assert_eq!(index.section("3", "1").unwrap().total, 2);
        assert_eq!(index.chapter("3").unwrap().total, 2);
        assert_eq!(index.global().total, 2);
    }

    #[test]
    fn test_section_totals_sum_to_chapter_total() {
        let (catalog, outlines, bank) = fixture();
        let index = AggregationIndex::build(&catalog, &outlines, &bank);

        let chapter_total = index.chapter("3").unwrap().total;
        let section_sum: u32 = bank
            .keys()
            .map(|k| k.section().to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .map(|s| index.section("3", &s).unwrap().total)
            .sum();

        assert_eq!(section_sum, chapter_total);
        assert_eq!(chapter_total, bank.question_count() as u32);
    }

    #[test]
    fn test_total_always_equals_year_sum() {
        let (catalog, outlines, bank) = fixture();
        let index = AggregationIndex::build(&catalog, &outlines, &bank);

        for breakdown in [
            index.global(),
            index.chapter("3").unwrap(),
            index.section("3", "1").unwrap(),
            index.item(&CompositeKey::new("3 | 1 | 2")).unwrap(),
        ] {
            assert_eq!(breakdown.total, breakdown.per_year.values().sum::<u32>());
        }
    }

    #[test]
    fn test_orphan_keys_count_everywhere_but_items() {
        let (catalog, outlines, _) = fixture();
        let bank = QuestionBank::from_json_str(
            r#"{
                "3 | 1 | 1": [{"id": "2021-12"}],
                "9 | 9 | 9": [{"id": "2022-05"}]
            }"#,
        )
        .unwrap();
        let index = AggregationIndex::build(&catalog, &outlines, &bank);

        // no outline item matches "9 | 9 | 9": excluded from item scope,
        // still present globally and under its own chapter/section parts
        assert!(index.item(&CompositeKey::new("9 | 9 | 9")).is_none());
        assert_eq!(index.global().total, 2);
        assert_eq!(index.chapter("9").unwrap().total, 1);
        assert_eq!(index.section("9", "9").unwrap().total, 1);
    }

    #[test]
    fn test_empty_bank_yields_zero_breakdowns_without_years() {
        let (catalog, outlines, _) = fixture();
        let bank = QuestionBank::default();
        let index = AggregationIndex::build(&catalog, &outlines, &bank);

        assert!(index.years().is_empty());
        assert_eq!(index.global().total, 0);
        assert_eq!(index.chapter("3").unwrap().total, 0);
    }

    #[test]
    fn test_breakdown_over_empty_list_keeps_year_columns() {
        let years = vec!["2021".to_string(), "2022".to_string()];
        let breakdown = Breakdown::over(std::iter::empty::<&Question>(), &years);
        assert_eq!(breakdown.total, 0);
        assert_eq!(breakdown.per_year.len(), 2);
        assert!(breakdown.per_year.values().all(|&c| c == 0));
    }

    #[test]
    fn test_colliding_default_keys_merge_counts() {
        // two unrelated short labels share "5 | 0 | 0"; their questions merge
        let catalog = ChapterCatalog::new(vec![Chapter {
            number: "5".to_string(),
            title: "5장".to_string(),
            source: Some("5장.md".to_string()),
        }]);
        let outline = ChapterOutline {
            sections: parser::parse("5", "# 개요\n- 영양\n- 양생"),
            origin: OutlineOrigin::Parsed,
        };
        let outlines = HashMap::from([("5".to_string(), Arc::new(outline))]);
        let bank = QuestionBank::from_json_str(
            r#"{"5 | 0 | 0": [{"id": "2021-01"}, {"id": "2022-02"}]}"#,
        )
        .unwrap();

        let index = AggregationIndex::build(&catalog, &outlines, &bank);
        // both items resolve to the same key and see the merged count
        let section = &outlines["5"].sections[0];
        assert_eq!(section.items[0].key, section.items[1].key);
        assert_eq!(index.item(&section.items[0].key).unwrap().total, 2);
    }
}

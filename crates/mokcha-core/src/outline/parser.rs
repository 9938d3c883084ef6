//! Raw outline text parsing
//!
//! Chapter sources are markdown-ish: `# N절 ...` headers open sections and
//! `- ` bullets list items. A two-state line scan is all the structure they
//! have; malformed lines degrade by best-effort classification and never
//! raise.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Item, Section};

/// Captures the `"N절"` numeral at the head of a section title
static SECTION_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)절").unwrap());

/// Parse raw chapter text into sections.
///
/// A `# ` header closes the open section (if any) and opens a new one; a
/// `- ` bullet appends an item to the open section. Bullets before the
/// first header have no section to attach to and are dropped, as are blank
/// lines. Pure: identical input yields identical structure.
pub fn parse(chapter_key: &str, raw: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for raw_line in raw.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("# ") {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            let raw_title = rest.trim().to_string();
            let section_key = SECTION_NUMERAL
                .captures(&raw_title)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "0".to_string());
            current = Some(Section {
                raw_title,
                section_key,
                items: Vec::new(),
            });
        } else if line.starts_with("- ") {
            let label = line.trim_start_matches('-').trim();
            if label.is_empty() {
                continue;
            }
            if let Some(section) = current.as_mut() {
                let item = Item::resolve(chapter_key, &section.section_key, label);
                section.items.push(item);
            }
        }
    }

    if let Some(done) = current.take() {
        sections.push(done);
    }
    sections
}

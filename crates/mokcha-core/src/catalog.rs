//! Chapter catalog
//!
//! Static configuration: the ordered list of chapters, each with its
//! content-store locator (or none, for chapters without authored outlines).

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Leading chapter number in a source file name, e.g. `"17장 알레르기 질환.md"`
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse `{path}`")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A chapter: identity, display title, optional source locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: String,
    pub title: String,
    /// Content-store locator for the raw outline text. `None` means no
    /// authored outline exists and the chapter is always synthesized.
    #[serde(default)]
    pub source: Option<String>,
}

impl Chapter {
    /// Build a chapter from a source file name like `"3장 성장과 발달.md"`:
    /// the leading digits are the chapter number, the stem is the title,
    /// and the file name itself is the locator.
    pub fn from_file_name(file: &str) -> Self {
        let title = file.strip_suffix(".md").unwrap_or(file).to_string();
        let number = LEADING_DIGITS
            .find(file)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "0".to_string());
        Self {
            number,
            title,
            source: Some(file.to_string()),
        }
    }
}

/// Ordered chapter list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterCatalog {
    pub chapters: Vec<Chapter>,
}

impl ChapterCatalog {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            chapters: names
                .into_iter()
                .map(|name| Chapter::from_file_name(name.as_ref()))
                .collect(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, number: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_from_file_name() {
        let chapter = Chapter::from_file_name("17장 알레르기 질환.md");
        assert_eq!(chapter.number, "17");
        assert_eq!(chapter.title, "17장 알레르기 질환");
        assert_eq!(chapter.source.as_deref(), Some("17장 알레르기 질환.md"));
    }

    #[test]
    fn test_file_name_without_leading_digits() {
        let chapter = Chapter::from_file_name("부록.md");
        assert_eq!(chapter.number, "0");
        assert_eq!(chapter.title, "부록");
    }

    #[test]
    fn test_from_toml() {
        let catalog = ChapterCatalog::from_toml_str(
            r#"
            [[chapters]]
            number = "1"
            title = "1장 서론"
            source = "1장 서론.md"

            [[chapters]]
            number = "7"
            title = "7장 소아 치료법"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("1").unwrap().source.as_deref(), Some("1장 서론.md"));
        // no source: chapter exists but will always synthesize
        assert_eq!(catalog.get("7").unwrap().source, None);
        assert!(catalog.get("99").is_none());
    }

    #[test]
    fn test_from_file_names_keeps_order() {
        let catalog = ChapterCatalog::from_file_names(["1장 서론.md", "2장 소아의 진단.md"]);
        let numbers: Vec<_> = catalog.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(numbers, ["1", "2"]);
    }
}

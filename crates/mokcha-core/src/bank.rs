//! Question repository
//!
//! The bank maps composite keys to the questions filed under them. It is
//! loaded wholesale from JSON and never mutated by the index side.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::key::CompositeKey;

/// Question-bank load failures, surfaced to the embedder at setup time
#[derive(Debug, Error)]
pub enum BankError {
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
        source: serde_json::Error,
    },
}

/// A single exam question record.
///
/// Only the fields this core reads are typed; everything else the rendering
/// surface may need rides along in `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// `"<year>-<sequence>"`
    pub id: String,
    /// Stored display label of the item this question is filed under
    #[serde(default)]
    pub item_key: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub options_html: String,
    /// Attachment locator, passed through for rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_1: Option<String>,
    /// Uninterpreted passthrough fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Question {
    /// Exam year: the id prefix before the first `-`
    pub fn year(&self) -> &str {
        self.id.split('-').next().unwrap_or("")
    }
}

/// The full question corpus, keyed by composite key
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: HashMap<CompositeKey, Vec<Question>>,
}

impl QuestionBank {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BankError::Read {
                path: path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| BankError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Questions filed under a key; empty when the key is unknown
    pub fn questions_for(&self, key: &CompositeKey) -> &[Question] {
        self.questions.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &[Question])> {
        self.questions.iter().map(|(key, questions)| (key, questions.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.questions.keys()
    }

    /// Every year appearing anywhere in the corpus, sorted and deduped
    pub fn all_years(&self) -> Vec<String> {
        let mut years: Vec<String> = self
            .questions
            .values()
            .flatten()
            .map(|q| q.year().to_string())
            .filter(|y| !y.is_empty())
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Total question count across all keys
    pub fn question_count(&self) -> usize {
        self.questions.values().map(Vec::len).sum()
    }
}

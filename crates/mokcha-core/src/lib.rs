//! Mokcha core
//!
//! Content index and query engine for a hierarchical study outline
//! (chapter → section → item) over an exam-question corpus.
//!
//! Key components:
//! - `key` - composite join keys between outline labels and the question bank
//! - `outline` - parsing, synthesis, and memoized loading of chapter outlines
//! - `aggregate` - per-node, per-year question breakdowns
//! - `search` - flattened substring search with count-based ranking
//! - `concept` - memoized supplementary-text loading
//! - `store` - the external content-store interface and its backends
//! - `bank` / `catalog` - the consumed question repository and chapter list
//! - `corpus` - service wiring with a build/reload lifecycle

pub mod aggregate;
pub mod bank;
pub mod catalog;
pub mod concept;
pub mod corpus;
pub mod key;
pub mod outline;
pub mod search;
pub mod store;
pub mod text;

pub use aggregate::{AggregationIndex, Breakdown};
pub use bank::{BankError, Question, QuestionBank};
pub use catalog::{CatalogError, Chapter, ChapterCatalog};
pub use concept::{ConceptCache, ConceptEntry};
pub use corpus::CorpusService;
pub use key::{derive_parts, resolve_item_key, CompositeKey, KeyParts};
pub use outline::{ChapterLoader, ChapterOutline, Item, OutlineOrigin, Section};
pub use search::{EntryKind, SearchEntry, SearchIndex};
pub use store::{ContentStore, DirStore, HttpStore, StoreError};

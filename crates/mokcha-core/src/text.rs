//! Plain-text extraction from marked-up question fields
//!
//! Question prompts and options arrive as HTML fragments; search only wants
//! the visible text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup down to plain text: tags removed, common entities decoded,
/// whitespace collapsed.
pub fn strip_markup(input: &str) -> String {
    let stripped = TAG.replace_all(input, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

//! Crude tag stripping for exported rich text.
//!
//! Any `<...>` span is removed. This is a regex pass over trusted export data,
//! not an HTML parser: text such as `a <3 b> c` loses the span as well.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Removes every tag-like span and trims surrounding whitespace.
pub fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, "").trim().to_string()
}

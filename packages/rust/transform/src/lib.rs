//! Source markup to destination content conversion.
//!
//! Both passes are lossy: markup is removed with a single regex
//! pass, and rich text is reduced to one block holding one plain text run.
//! Headings, lists, links and inline images in the source do not survive.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use wpmigrate_shared::{Block, Span};

/// Strip all markup tags and trim surrounding whitespace.
///
/// Entities such as `&amp;` are left as-is.
pub fn strip_markup(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    TAG_RE.replace_all(text, "").trim().to_string()
}

/// Convert a markup string into a block sequence.
///
/// Always returns exactly one `normal` block containing exactly one unmarked
/// span whose text is [`strip_markup`] of the input.
pub fn to_blocks(markup: &str) -> Vec<Block> {
    let text = strip_markup(markup);
    trace!(in_len = markup.len(), out_len = text.len(), "converted markup to block");

    vec![Block {
        key: "block-0".into(),
        style: "normal".into(),
        children: vec![Span {
            key: "span-0".into(),
            text,
            marks: Vec::new(),
        }],
        mark_defs: Vec::new(),
    }]
}

//! Doc-comment parser.
//!
//! The header documents each function with a block comment made of
//! `Key: text` sections:
//!
//! ```text
//! /* Lifecycle: Start the main thread.
//!  *   Continuation lines are indented.
//!  *
//!  *   An indented line after a blank one starts a new paragraph.
//!  *
//!  * Returns: 0 on success, -1 on failure.
//!  */
//! ```
//!
//! Unindented lines start a section, indented lines continue it. Text with
//! no `Key: ` prefix is ignored.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::ParsedDoc;

/// Leading `/`, whitespace and one `*`, plus the single character after it.
static RE_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[/\s]+\*(?:[/\s]|$)").unwrap());

/// Newlines followed by an indent of two or more spaces.
static RE_INDENTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\n+)  +").unwrap());

/// Parse the text between `/*` and `*/`.
pub fn parse(raw: Option<&str>) -> ParsedDoc {
    let mut doc = ParsedDoc::default();
    let Some(raw) = raw else {
        return doc;
    };

    let undecorated: Vec<String> = raw
        .lines()
        .map(|l| RE_DECORATION.replace(l, "").trim_end().to_string())
        .collect();

    // One newline + indent continues the line; a blank line + indent leaves
    // a double space that later becomes a paragraph break.
    let joined = undecorated.join("\n");
    let reflowed = RE_INDENTED.replace_all(&joined, |caps: &Captures| {
        if caps[1].len() == 1 { " " } else { "  " }
    });

    for line in reflowed.lines().filter(|l| !l.trim().is_empty()) {
        let line = line.replace("  ", "\n\n");
        let Some((key, text)) = line.split_once(": ") else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        doc.insert(key, text.trim());
    }

    doc
}

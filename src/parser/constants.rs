//! Constant extractor for whitelisted `#define NAME VALUE` lines.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Constant;
use crate::profile::Profile;

static RE_BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Extract constants in first-seen order.
///
/// A name defined twice (e.g. on both sides of an `#ifdef`) keeps the slot
/// of its first definition and the value of its last.
pub fn extract(header: &str, profile: &Profile) -> Vec<Constant> {
    let uncommented = RE_BLOCK_COMMENT.replace_all(header, "");
    let mut constants: Vec<Constant> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for line in uncommented.lines() {
        let Some((name, value)) = split_define(line) else {
            continue;
        };
        if !profile.accepts_constant(name) {
            continue;
        }
        match seen.get(name) {
            Some(&slot) => constants[slot].value = value.to_string(),
            None => {
                seen.insert(name.to_string(), constants.len());
                constants.push(Constant {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    constants
}

/// `#define NAME rest of line` → `(NAME, rest of line)`.
/// Anything with fewer than three fields is not a usable constant.
fn split_define(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix("#define")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let (name, value) = rest.split_once(char::is_whitespace)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((name, value))
}

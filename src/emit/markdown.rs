//! Reference manual in markdown.
//!
//! Functions are grouped by the category of their doc comment, in the order
//! categories first appear. Each function gets a short anchor built by
//! [`text::disemvowel`]. The `jni` flavor documents the Java-facing API.

use tracing::warn;

use crate::emit::java::{java_ident, java_name, java_type};
use crate::emit::text;
use crate::emit::{Context, Emitter};
use crate::error::Result;
use crate::model::{Api, FunctionSignature};
use crate::profile::Profile;
use crate::types;

pub struct MarkdownEmitter {
    pub jni: bool,
}

/// One documented function, already in the flavor's names and types.
struct Entry {
    name: String,
    return_type: String,
    /// `(declaration, description)`
    arguments: Vec<(String, String)>,
    body: String,
    returns: String,
}

enum Block {
    Entry(Entry),
    Stub(String),
}

fn api_entry(func: &FunctionSignature) -> Entry {
    Entry {
        name: func.name.clone(),
        return_type: func.return_type.trim().to_string(),
        arguments: func
            .parameters
            .iter()
            .map(|p| (p.declaration(), p.doc.clone().unwrap_or_default()))
            .collect(),
        body: func.doc.body().to_string(),
        returns: func
            .doc
            .returns(&["API Returns", "Returns"])
            .map(str::to_string)
            .unwrap_or_else(|| func.return_type.trim().to_string()),
    }
}

fn jni_entry(func: &FunctionSignature, profile: &Profile) -> Result<Entry> {
    let r = types::resolve(func, profile)?;
    let return_type = java_type(r.returns).to_string();
    Ok(Entry {
        name: java_name(&func.name, profile),
        arguments: r
            .params
            .iter()
            .map(|(ty, p)| {
                (
                    format!("{} {}", java_type(*ty), java_ident(&p.name)),
                    p.doc.clone().unwrap_or_default(),
                )
            })
            .collect(),
        body: func.doc.body().to_string(),
        returns: func
            .doc
            .returns(&["JNI Returns", "Returns"])
            .map(str::to_string)
            .unwrap_or_else(|| return_type.clone()),
        return_type,
    })
}

fn render_entry(entry: &Entry) -> String {
    let anchor = text::disemvowel(&entry.name);
    let mut lines = vec![
        format!("<a {:>76}", format!(" name=\"{}\"><hr></a>", anchor)),
        String::new(),
        format!("#### `{} {}(...)`", entry.return_type, entry.name),
        String::new(),
    ];

    let body = text::wrap_lines(&entry.body, 60);
    if !body.trim().is_empty() {
        lines.push(body.trim().to_string());
        lines.push(String::new());
    }

    if !entry.arguments.is_empty() {
        lines.push("**Arguments**:".to_string());
        lines.push(String::new());
        for (decl, doc) in &entry.arguments {
            lines.push(format!("   * `{}`: {}", decl, doc).trim_end().to_string());
        }
        lines.push(String::new());
    }

    lines.push(format!("**Returns**: {}", entry.returns));
    lines.join("\n")
}

fn toc_line(name: &str) -> String {
    format!("      * [`{:<44}`](#{})", name, text::disemvowel(name))
}

impl MarkdownEmitter {
    fn block(&self, func: &FunctionSignature, profile: &Profile) -> Block {
        if !self.jni {
            return Block::Entry(api_entry(func));
        }
        match jni_entry(func, profile) {
            Ok(entry) => Block::Entry(entry),
            Err(e) => {
                warn!("markdown (jni): stubbing {}: {}", func.name, e);
                Block::Stub(format!("> FIXME: `{}`", func.prototype()))
            }
        }
    }
}

impl Emitter for MarkdownEmitter {
    fn emit(&self, api: &Api, ctx: &Context) -> String {
        let mut groups: Vec<(&str, Vec<Block>)> = Vec::new();
        for func in &api.functions {
            let category = func.doc.category();
            let block = self.block(func, ctx.profile);
            match groups.iter_mut().find(|(c, _)| *c == category) {
                Some((_, blocks)) => blocks.push(block),
                None => groups.push((category, vec![block])),
            }
        }

        let mut toc = Vec::new();
        let mut details = Vec::new();
        for (category, blocks) in &groups {
            toc.push(format!("   * {}", category));
            let mut first = true;
            for block in blocks {
                let mut rendered = match block {
                    Block::Entry(entry) => {
                        toc.push(toc_line(&entry.name));
                        render_entry(entry)
                    }
                    Block::Stub(marker) => marker.clone(),
                };
                if first {
                    rendered = format!("### {}\n\n{}", category, rendered);
                    first = false;
                }
                details.push(rendered);
            }
        }

        let constants: Vec<String> = api
            .constants
            .iter()
            .map(|c| format!(" * `{}`: `{}`", c.name, c.value))
            .collect();

        let mut out = vec![format!("# {}", ctx.profile.doc_title), String::new()];
        if !toc.is_empty() {
            out.push(toc.join("\n"));
            out.push(String::new());
        }
        out.push("## Functions".to_string());
        out.push(String::new());
        if !details.is_empty() {
            out.push(details.join("\n\n"));
            out.push(String::new());
        }
        out.push("## Constants".to_string());
        out.push(String::new());
        if !constants.is_empty() {
            out.push(constants.join("\n"));
        }
        out.join("\n").trim_end().to_string() + "\n"
    }

    fn target(&self) -> &str {
        if self.jni {
            "markdown (jni)"
        } else {
            "markdown"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    fn emit(header: &str, jni: bool) -> String {
        let profile = Profile::default();
        let api = parse_header(header, &profile);
        MarkdownEmitter { jni }.emit(
            &api,
            &Context {
                profile: &profile,
                year: 2024,
            },
        )
    }

    const HEADER: &str = "\
/* Lifecycle: Start the manager.
 * Returns: 0 on success
 */
int pagekite_start(pagekite_mgr pkm);

/* Kites: Add a kite.
 * API Returns: 0 on success, -1 on failure
 * JNI Returns: 0 on success
 */
int pagekite_add_kite(pagekite_mgr pkm,
  const char* proto, /* Protocol */
  int pport          /* Public port */
  );

/* Lifecycle: Stop the manager.
 */
int pagekite_stop(pagekite_mgr pkm);

#define PK_LOG_NORMAL 7
";

    #[test]
    fn example_four_category_is_arguments() {
        let out = emit(
            "/* Arguments: The manager.\n * API Returns: 0 on success\n */\nint pagekite_poll(pagekite_mgr pkm);",
            false,
        );
        assert!(out.contains("   * Arguments\n"));
        assert!(out.contains("### Arguments\n\n<a "));
        assert!(out.contains("**Returns**: 0 on success"));
    }

    #[test]
    fn groups_by_category_in_first_seen_order() {
        let out = emit(HEADER, false);
        let toc_end = out.find("## Functions").unwrap();
        let toc = &out[..toc_end];
        let lifecycle = toc.find("   * Lifecycle").unwrap();
        let kites = toc.find("   * Kites").unwrap();
        assert!(lifecycle < kites);
        assert!(toc.find("pagekite_stop").unwrap() < kites);
        assert_eq!(out.matches("### Lifecycle").count(), 1);
    }

    #[test]
    fn detail_block_layout() {
        let out = emit(HEADER, false);
        let anchor = format!("<a {:>76}", " name=\"pgktddkt\"><hr></a>");
        let expected = format!(
            "{}\n\n#### `int pagekite_add_kite(...)`\n\nAdd a kite.\n\n**Arguments**:\n\n   * `pagekite_mgr pkm`:\n   * `const char* proto`: Protocol\n   * `int pport`: Public port\n\n**Returns**: 0 on success, -1 on failure",
            anchor
        );
        assert!(out.contains(&expected), "{}", out);
        let toc_entry = format!("      * [`{}{}`](#pgktddkt)", "pagekite_add_kite", " ".repeat(27));
        assert!(out.contains(&toc_entry));
    }

    #[test]
    fn jni_flavor_uses_java_names() {
        let out = emit(HEADER, true);
        assert!(out.contains("#### `int addKite(...)`"));
        assert!(out.contains("   * `String proto`: Protocol\n   * `int pport`: Public port\n"));
        assert!(!out.contains("`pagekite_mgr pkm`"));
        assert!(out.contains("**Returns**: 0 on success\n"));
        assert!(out.contains("(#ddKt)"));
    }

    #[test]
    fn undocumented_and_unmappable_functions() {
        let header = "int pagekite_tick(pagekite_mgr);\nint pagekite_enable_plugins(pagekite_mgr, char** settings);";
        let api = emit(header, false);
        assert!(api.contains("### None\n"));
        assert!(api.contains("#### `int pagekite_enable_plugins(...)`"));
        let jni = emit(header, true);
        assert!(jni.contains("#### `int tick(...)`"));
        assert!(jni.contains("> FIXME: `int pagekite_enable_plugins(pagekite_mgr, char** settings)`"));
    }

    #[test]
    fn constants_close_the_manual() {
        let out = emit(HEADER, false);
        assert!(out.starts_with("# PageKite API reference manual\n\n"));
        assert!(out.ends_with("## Constants\n\n * `PK_LOG_NORMAL`: `7`\n"));
    }
}

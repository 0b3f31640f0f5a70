//! Java class with one `native` method per API function.
//!
//! The class binds to a single implicit manager handle held by the native
//! glue, so the handle parameter never appears in a Java signature.

use tracing::warn;

use crate::emit::text;
use crate::emit::{Context, Emitter};
use crate::error::Result;
use crate::model::{Api, Constant, FunctionSignature};
use crate::profile::Profile;
use crate::types::{self, ApiType};

pub struct JavaEmitter;

/// Java spelling of a classified type. Handles and `void` surface as a
/// success flag.
pub fn java_type(ty: ApiType) -> &'static str {
    match ty {
        ApiType::Handle | ApiType::Void => "boolean",
        ApiType::Int | ApiType::UnsignedInt | ApiType::FailureInt => "int",
        ApiType::Str | ApiType::ConstStr => "String",
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

/// A C name usable as a Java identifier; reserved words get a trailing `_`.
pub fn java_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// `pagekite_add_kite` → `addKite`.
pub fn java_name(function: &str, profile: &Profile) -> String {
    text::camel_case(profile.short_name(function))
}

/// `public static native int addKite(String proto, int pport);`
pub fn native_method(func: &FunctionSignature, profile: &Profile) -> Result<String> {
    let resolved = types::resolve(func, profile)?;
    let params: Vec<String> = resolved
        .params
        .iter()
        .map(|(ty, p)| format!("{} {}", java_type(*ty), java_ident(&p.name)))
        .collect();
    Ok(format!(
        "public static native {} {}({});",
        java_type(resolved.returns),
        java_name(&func.name, profile),
        params.join(", ")
    ))
}

fn constant(c: &Constant) -> String {
    let ty = if c.is_string() { "String" } else { "int" };
    format!("public static final {} {} = {};", ty, c.name, c.value)
}

impl Emitter for JavaEmitter {
    fn emit(&self, api: &Api, ctx: &Context) -> String {
        let profile = ctx.profile;
        let mut lines: Vec<String> = vec![
            text::c_banner(&profile.java_class, profile, ctx.year),
            format!("package {};", profile.java_package),
            String::new(),
            format!("public class {} extends Object", profile.java_class),
            "{".to_string(),
        ];

        for c in &api.constants {
            lines.push(format!("    {}", constant(c)));
        }
        lines.push(String::new());

        for func in &api.functions {
            match native_method(func, profile) {
                Ok(method) => lines.push(format!("    {}", method)),
                Err(e) => {
                    warn!("java: stubbing {}: {}", func.name, e);
                    lines.push(format!("    /* FIXME: {} */", func.prototype()));
                }
            }
        }

        lines.extend(
            [
                "",
                "    public static boolean libLoaded;",
                "    static {",
                "        try {",
            ]
            .iter()
            .map(|l| l.to_string()),
        );
        lines.push(format!("            System.loadLibrary(\"{}\");", profile.library));
        lines.extend(
            [
                "            libLoaded = true;",
                "        } catch (Throwable t) { }",
                "    }",
                "}",
            ]
            .iter()
            .map(|l| l.to_string()),
        );

        lines.join("\n") + "\n"
    }

    fn target(&self) -> &str {
        "java"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    fn emit(header: &str) -> String {
        let profile = Profile::default();
        let api = parse_header(header, &profile);
        JavaEmitter.emit(
            &api,
            &Context {
                profile: &profile,
                year: 2024,
            },
        )
    }

    #[test]
    fn instance_method_drops_handle() {
        let out = emit("/* Returns: 0 on success */\nint pagekite_tick(pagekite_mgr m);");
        assert!(out.contains("    public static native int tick();\n"));
    }

    #[test]
    fn constructor_keeps_all_parameters() {
        let out = emit("pagekite_mgr pagekite_init(const char* app_id, int max_kites);");
        assert!(out.contains("public static native boolean init(String app_id, int max_kites);"));
    }

    #[test]
    fn reserved_words_are_escaped() {
        let out = emit("int pagekite_spawn(pagekite_mgr, int new, const char* class);");
        assert!(out.contains("    public static native int spawn(int new_, String class_);"));
        assert_eq!(java_ident("port"), "port");
    }

    #[test]
    fn typed_constants() {
        let out = emit("#define PK_VERSION \"0.91\"\n#define PK_LOG_ALL 0xffff00\n");
        assert!(out.contains("    public static final String PK_VERSION = \"0.91\";"));
        assert!(out.contains("    public static final int PK_LOG_ALL = 0xffff00;"));
    }

    #[test]
    fn unmappable_function_is_stubbed_without_losing_siblings() {
        let out = emit(
            "int pagekite_enable_plugins(pagekite_mgr, char** settings);\nchar* pagekite_get_log(pagekite_mgr);",
        );
        assert!(out.contains("    /* FIXME: int pagekite_enable_plugins(pagekite_mgr, char** settings) */"));
        assert!(out.contains("    public static native String getLog();"));
    }

    #[test]
    fn class_shell() {
        let out = emit("");
        assert!(out.starts_with("/* ****"));
        assert!(out.contains("package net.pagekite.lib;\n\npublic class PageKiteAPI extends Object\n{\n"));
        assert!(out.contains("System.loadLibrary(\"pagekite\");"));
        assert!(out.ends_with("}\n"));
    }
}

//! ctypes wrapper module.
//!
//! One call-through method per function on a class that owns the manager
//! handle. Constructors store the handle, instance methods pass it first,
//! release functions forget it.

use tracing::warn;

use crate::emit::text;
use crate::emit::{Context, Emitter};
use crate::model::{Api, FunctionSignature};
use crate::profile::Profile;
use crate::types::{self, ApiType, Kind, Resolved};

pub struct PythonEmitter;

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield", "self",
];

fn ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// ctypes spelling; `None` is how ctypes says `void`.
pub fn ctypes_type(ty: ApiType) -> &'static str {
    match ty {
        ApiType::Handle => "c_void_p",
        ApiType::Void => "None",
        ApiType::Int | ApiType::FailureInt => "c_int",
        ApiType::UnsignedInt => "c_uint",
        ApiType::Str | ApiType::ConstStr => "c_char_p",
    }
}

/// Returns text for a docstring, most specific section first.
fn returns_text(func: &FunctionSignature) -> String {
    func.doc
        .returns(&["Python Returns", "API Returns", "Returns"])
        .map(str::to_string)
        .unwrap_or_else(|| func.return_type.trim().to_string())
}

fn escape_docstring(s: &str) -> String {
    s.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

fn indent(text: &str, prefix: &str) -> Vec<String> {
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, l)
            }
        })
        .collect()
}

fn table_entry(r: &Resolved) -> String {
    let mut argtypes: Vec<&str> = Vec::new();
    if r.kind == Kind::Instance {
        argtypes.push(ctypes_type(ApiType::Handle));
    }
    argtypes.extend(r.params.iter().map(|(ty, _)| ctypes_type(*ty)));
    format!(
        "        ('{}', {}, [{}]),",
        r.func.name,
        ctypes_type(r.returns),
        argtypes.join(", ")
    )
}

fn docstring(r: &Resolved) -> Vec<String> {
    let pad = "        ";
    let mut body = text::wrap_lines(r.func.doc.body(), 60).trim().to_string();
    if body.is_empty() {
        body = format!("Wrapper for `{}`.", r.func.name);
    }
    let mut lines = vec![format!("{}\"\"\"", pad)];
    lines.extend(indent(&escape_docstring(&body), pad));

    if !r.params.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}Args:", pad));
        for (_, p) in &r.params {
            let doc = p.doc.as_deref().unwrap_or("");
            lines.push(
                format!("{}    * `{}`: {}", pad, p.declaration(), escape_docstring(doc))
                    .trim_end()
                    .to_string(),
            );
        }
    }

    lines.push(String::new());
    let returns = escape_docstring(&returns_text(r.func));
    let mut returns_lines = returns.lines();
    lines.push(format!("{}Returns: {}", pad, returns_lines.next().unwrap_or("")));
    for l in returns_lines {
        lines.push(if l.trim().is_empty() {
            String::new()
        } else {
            format!("{}    {}", pad, l.trim())
        });
    }
    lines.push(format!("{}\"\"\"", pad));
    lines
}

fn method(r: &Resolved, profile: &Profile) -> String {
    let handle = format!("self.{}", profile.python_handle);
    let names: Vec<String> = r.params.iter().map(|(_, p)| ident(&p.name)).collect();

    let mut sig = vec!["self".to_string()];
    sig.extend(names.iter().cloned());
    let mut lines = vec![format!(
        "    def {}({}):",
        ident(profile.short_name(&r.func.name)),
        sig.join(", ")
    )];
    lines.extend(docstring(r));

    let mut args = Vec::new();
    if r.kind == Kind::Instance {
        args.push(handle.clone());
    }
    for ((ty, _), name) in r.params.iter().zip(&names) {
        if ty.is_string() {
            args.push(format!("_bytes({})", name));
        } else {
            args.push(name.clone());
        }
    }
    let call = format!("self.dll.{}({})", r.func.name, args.join(", "));

    match r.kind {
        Kind::Constructor => {
            lines.push(format!("        assert({} is None)", handle));
            lines.push(format!("        {} = {}", handle, call));
            lines.push(format!("        return self if {} else None", handle));
        }
        Kind::Instance if profile.is_release(&r.func.name) => {
            lines.push(format!("        assert({} is not None)", handle));
            lines.push(format!("        rv = {}", call));
            lines.push(format!("        {} = None", handle));
            lines.push("        return rv".to_string());
        }
        Kind::Instance => {
            lines.push(format!("        assert({} is not None)", handle));
            lines.push(format!("        return {}", call));
        }
        Kind::Static => lines.push(format!("        return {}", call)),
    }
    lines.join("\n")
}

fn class_preamble(resolved: &[Resolved], profile: &Profile) -> Vec<String> {
    let handle = format!("self.{}", profile.python_handle);
    let mut lines = vec![
        format!("class {}(object):", profile.python_class),
        "    def __init__(self):".to_string(),
        format!("        self.dll = get_{}_cdll()", profile.project),
        format!("        {} = None", handle),
        String::new(),
        "    def __enter__(self):".to_string(),
        "        return self".to_string(),
        String::new(),
        "    def __exit__(self, exc_type, exc_value, traceback):".to_string(),
        "        self.cleanup()".to_string(),
        String::new(),
        "    def cleanup(self):".to_string(),
    ];

    let calls: Vec<String> = profile
        .cleanup_functions
        .iter()
        .filter(|short| {
            resolved.iter().any(|r| {
                r.kind == Kind::Instance && profile.short_name(&r.func.name) == short.as_str()
            })
        })
        .map(|short| format!("            self.{}()", ident(short)))
        .collect();
    if calls.is_empty() {
        lines.push("        pass".to_string());
    } else {
        lines.push(format!("        if {} is not None:", handle));
        lines.extend(calls);
    }
    lines
}

impl Emitter for PythonEmitter {
    fn emit(&self, api: &Api, ctx: &Context) -> String {
        let profile = ctx.profile;
        let mut resolved = Vec::new();
        let mut stubs = Vec::new();
        for func in &api.functions {
            match types::resolve(func, profile) {
                Ok(r) => resolved.push(r),
                Err(e) => {
                    warn!("python: stubbing {}: {}", func.name, e);
                    stubs.push(format!("# FIXME: {}", func.prototype()));
                }
            }
        }

        let mut out = vec![
            text::hash_banner(&format!("{}-Python", profile.project), profile, ctx.year),
            "from ctypes import cdll, c_void_p, c_char_p, c_int, c_uint".to_string(),
            String::new(),
            String::new(),
        ];

        if !api.constants.is_empty() {
            for c in &api.constants {
                out.push(format!("{} = {}", c.name, c.value));
            }
            out.push(String::new());
            out.push(String::new());
        }

        out.extend(
            [
                "def _bytes(value):",
                "    if value is None or isinstance(value, bytes):",
                "        return value",
                "    return value.encode('utf-8')",
                "",
                "",
            ]
            .iter()
            .map(|l| l.to_string()),
        );

        out.push(format!("def get_{}_cdll():", profile.project));
        out.push(format!(
            "    dll = cdll.LoadLibrary('{}')",
            profile.python_library
        ));
        out.push("    for name, restype, argtypes in (".to_string());
        out.extend(resolved.iter().map(table_entry));
        out.push("    ):".to_string());
        out.push("        func = getattr(dll, name)".to_string());
        out.push("        func.restype = restype".to_string());
        out.push("        func.argtypes = argtypes".to_string());
        out.push("    return dll".to_string());
        out.push(String::new());
        out.push(String::new());

        if !stubs.is_empty() {
            out.extend(stubs);
            out.push(String::new());
            out.push(String::new());
        }

        out.extend(class_preamble(&resolved, profile));
        for r in &resolved {
            out.push(String::new());
            out.push(method(r, profile));
        }

        out.join("\n") + "\n"
    }

    fn target(&self) -> &str {
        "python"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    fn emit(header: &str) -> String {
        let profile = Profile::default();
        let api = parse_header(header, &profile);
        PythonEmitter.emit(
            &api,
            &Context {
                profile: &profile,
                year: 2024,
            },
        )
    }

    #[test]
    fn instance_method_asserts_handle() {
        let out = emit("/* Returns: 0 on success */\nint pagekite_tick(pagekite_mgr m);");
        let expected = "    def tick(self):
        \"\"\"
        Wrapper for `pagekite_tick`.

        Returns: 0 on success
        \"\"\"
        assert(self.pkm is not None)
        return self.dll.pagekite_tick(self.pkm)
";
        assert!(out.contains(expected), "{}", out);
        assert!(out.contains("        ('pagekite_tick', c_int, [c_void_p]),"));
    }

    #[test]
    fn constructor_stores_handle() {
        let out = emit("pagekite_mgr pagekite_init(const char* app_id /* Application name */, int max_kites);");
        assert!(out.contains("    def init(self, app_id, max_kites):"));
        assert!(out.contains("            * `const char* app_id`: Application name\n"));
        assert!(out.contains("            * `int max_kites`:\n"));
        assert!(out.contains("        assert(self.pkm is None)\n        self.pkm = self.dll.pagekite_init(_bytes(app_id), max_kites)\n        return self if self.pkm else None"));
        assert!(out.contains("        ('pagekite_init', c_void_p, [c_char_p, c_int]),"));
    }

    #[test]
    fn returns_preference() {
        let out = emit(
            "/* Lifecycle: Stop.\n * Returns: int\n * API Returns: 0 on success\n * Python Returns: nothing useful\n */\nint pagekite_stop(pagekite_mgr);\n\
             /* Lifecycle: Go.\n * API Returns: -1 on failure\n */\nint pagekite_go(pagekite_mgr);\n\
             const char* pagekite_version(void);",
        );
        assert!(out.contains("        Returns: nothing useful\n"));
        assert!(out.contains("        Returns: -1 on failure\n"));
        assert!(out.contains("        Returns: const char*\n"));
    }

    #[test]
    fn release_and_cleanup() {
        let out = emit("int pagekite_thread_stop(pagekite_mgr);\nint pagekite_free(pagekite_mgr);");
        assert!(out.contains("        rv = self.dll.pagekite_free(self.pkm)\n        self.pkm = None\n        return rv"));
        assert!(out.contains("        if self.pkm is not None:\n            self.thread_stop()\n            self.free()\n"));
    }

    #[test]
    fn static_function_and_keywords() {
        let out = emit("const char* pagekite_version(void);\nint pagekite_lookup(const char* from);");
        assert!(out.contains("        return self.dll.pagekite_version()\n"));
        assert!(out.contains("    def lookup(self, from_):"));
        assert!(out.contains("self.dll.pagekite_lookup(_bytes(from_))"));
        assert!(out.contains("    def cleanup(self):\n        pass\n"));
    }

    #[test]
    fn module_layout() {
        let out = emit("#define PK_VERSION \"0.91\"\nint pagekite_enable_plugins(pagekite_mgr, char** settings);");
        assert!(out.starts_with("####"));
        assert!(out.contains("\nPK_VERSION = \"0.91\"\n"));
        assert!(out.contains("def get_libpagekite_cdll():\n    dll = cdll.LoadLibrary('libpagekite.so')"));
        assert!(out.contains("# FIXME: int pagekite_enable_plugins(pagekite_mgr, char** settings)"));
        assert!(out.contains("class PageKite(object):"));
        assert!(!out.contains("def enable_plugins"));
    }
}

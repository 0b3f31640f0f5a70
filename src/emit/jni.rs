//! JNI bridge functions backing the generated Java class.
//!
//! The Java side never sees the manager handle. The bridge keeps it in a
//! single [`HandleSlot`]: constructors fill it, instance calls read it and
//! release functions empty it, so at most one instance is live per process.

use tracing::warn;

use crate::emit::java::{java_name, java_type};
use crate::emit::text;
use crate::emit::{Context, Emitter};
use crate::error::Result;
use crate::model::{Api, FunctionSignature};
use crate::profile::Profile;
use crate::types::{self, ApiType, Kind, Resolved};

/// The one-element handle registry the generated C code owns.
#[derive(Debug, Clone)]
pub struct HandleSlot {
    name: String,
    handle_type: String,
}

impl HandleSlot {
    pub fn new(name: impl Into<String>, handle_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle_type: handle_type.into(),
        }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::new(
            format!("{}_manager_slot", profile.library),
            profile.handle_type.clone(),
        )
    }

    pub fn declaration(&self) -> String {
        format!(
            "static struct {{\n  int present;\n  {} manager;\n}} {} = {{0, NULL}};",
            self.handle_type, self.name
        )
    }

    pub fn present(&self) -> String {
        format!("{}.present", self.name)
    }

    pub fn manager(&self) -> String {
        format!("{}.manager", self.name)
    }

    /// Statements storing `value`; the slot only counts as present when
    /// the value is non-NULL.
    fn store(&self, value: &str) -> Vec<String> {
        vec![
            format!("  {} = {};", self.manager(), value),
            format!("  {} = ({} != NULL);", self.present(), self.manager()),
        ]
    }

    fn clear(&self) -> Vec<String> {
        vec![
            format!("  {} = NULL;", self.manager()),
            format!("  {} = 0;", self.present()),
        ]
    }
}

pub struct JniEmitter {
    slot: HandleSlot,
}

impl JniEmitter {
    pub fn new(slot: HandleSlot) -> Self {
        Self { slot }
    }

    fn bridge(&self, func: &FunctionSignature, profile: &Profile) -> Result<String> {
        let r = types::resolve(func, profile)?;
        let mut lines = vec![format!(
            "{} {}(",
            jni_type(r.returns),
            bridge_name(profile, &java_name(&func.name, profile))
        )];
        lines.push("  JNIEnv* env, jclass unused_class".to_string());
        for (ty, p) in &r.params {
            lines.push(format!(", {} j{}", jni_type(*ty), p.name));
        }
        lines.push("){".to_string());

        match r.kind {
            Kind::Constructor => {
                lines.push(format!("  if ({}) return JNI_FALSE;", self.slot.present()));
                lines.push(String::new());
            }
            Kind::Instance => {
                lines.push(format!(
                    "  if (!{}) return {};",
                    self.slot.present(),
                    sentinel(r.returns)
                ));
                lines.push(String::new());
            }
            Kind::Static => {}
        }

        let mut cleanup = Vec::new();
        for (ty, p) in &r.params {
            let local = c_local(&p.name);
            if ty.is_string() {
                lines.push(format!("  const char* {} = NULL;", local));
                lines.push(format!(
                    "  if (j{0} != NULL) {1} = (*env)->GetStringUTFChars(env, j{0}, NULL);",
                    p.name, local
                ));
                cleanup.push(format!(
                    "  if (j{0} != NULL) (*env)->ReleaseStringUTFChars(env, j{0}, {1});",
                    p.name, local
                ));
            } else {
                lines.push(format!("  {} {} = j{};", p.c_type, local, p.name));
            }
        }
        if !r.params.is_empty() {
            lines.push(String::new());
        }

        let call = self.call(&r);
        match r.kind {
            Kind::Constructor => {
                lines.extend(self.slot.store(&call));
                lines.push(format!(
                    "  jboolean rv = {} ? JNI_TRUE : JNI_FALSE;",
                    self.slot.present()
                ));
            }
            Kind::Instance | Kind::Static => {
                lines.extend(capture(r.returns, &func.return_type, &call));
                if r.kind == Kind::Instance && profile.is_release(&func.name) {
                    lines.extend(self.slot.clear());
                }
            }
        }

        if !cleanup.is_empty() {
            lines.push(String::new());
            lines.extend(cleanup);
        }
        lines.push("  return rv;".to_string());
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    fn call(&self, r: &Resolved) -> String {
        let mut args = Vec::new();
        if r.kind == Kind::Instance {
            args.push(self.slot.manager());
        }
        for (ty, p) in &r.params {
            let local = c_local(&p.name);
            match ty {
                ApiType::Str => args.push(format!("(char*) {}", local)),
                _ => args.push(local),
            }
        }
        format!("{}({})", r.func.name, args.join(", "))
    }
}

/// `jint`, `jboolean` or `jstring`.
pub fn jni_type(ty: ApiType) -> String {
    format!("j{}", java_type(ty).to_lowercase())
}

/// Value returned when a call is refused for lack of a live handle.
pub fn sentinel(ty: ApiType) -> &'static str {
    match ty {
        ApiType::Int | ApiType::UnsignedInt | ApiType::FailureInt => "-1",
        ApiType::Handle | ApiType::Void => "JNI_FALSE",
        ApiType::Str | ApiType::ConstStr => "NULL",
    }
}

/// `Java_net_pagekite_lib_PageKiteAPI_addKite`
pub fn bridge_name(profile: &Profile, method: &str) -> String {
    format!(
        "Java_{}_{}_{}",
        mangle(&profile.java_package),
        mangle(&profile.java_class),
        mangle(method)
    )
}

/// Names every bridge declares for itself.
const BRIDGE_LOCALS: &[&str] = &["env", "unused_class", "rv", "crv"];

/// Local variable holding a converted argument; renamed when it would
/// shadow one of the bridge's own names.
fn c_local(name: &str) -> String {
    if BRIDGE_LOCALS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

// JNI short-name escaping for the characters our names can contain.
fn mangle(name: &str) -> String {
    name.replace('_', "_1").replace('.', "_")
}

fn capture(returns: ApiType, c_type: &str, call: &str) -> Vec<String> {
    match returns {
        ApiType::Int | ApiType::UnsignedInt | ApiType::FailureInt => {
            vec![format!("  jint rv = {};", call)]
        }
        ApiType::Str | ApiType::ConstStr => vec![
            format!("  {} crv = {};", c_type.trim(), call),
            "  jstring rv = (crv != NULL) ? (*env)->NewStringUTF(env, crv) : NULL;".to_string(),
        ],
        ApiType::Void => vec![format!("  {};", call), "  jboolean rv = JNI_TRUE;".to_string()],
        ApiType::Handle => vec![format!(
            "  jboolean rv = ({} != NULL) ? JNI_TRUE : JNI_FALSE;",
            call
        )],
    }
}

impl Emitter for JniEmitter {
    fn emit(&self, api: &Api, ctx: &Context) -> String {
        let profile = ctx.profile;
        let bridges: Vec<String> = api
            .functions
            .iter()
            .map(|func| match self.bridge(func, profile) {
                Ok(code) => code,
                Err(e) => {
                    warn!("jni: stubbing {}: {}", func.name, e);
                    format!("/* FIXME: {} */", func.prototype())
                }
            })
            .collect();

        let mut lines = vec![text::c_banner(
            &format!("{}-jni.c", profile.library),
            profile,
            ctx.year,
        )];
        for include in &profile.c_includes {
            lines.push(format!("#include \"{}\"", include));
        }
        lines.extend([
            String::new(),
            "#ifdef HAVE_JNI_H".to_string(),
            "#include <jni.h>".to_string(),
            String::new(),
            self.slot.declaration(),
            String::new(),
            bridges.join("\n\n"),
            "#else".to_string(),
            "#  warning Java not found, not building JNI.".to_string(),
            "#endif".to_string(),
        ]);
        lines.join("\n") + "\n"
    }

    fn target(&self) -> &str {
        "jni"
    }
}

//! Output targets, dispatched by file extension.
//!
//! Every emitter is a pure function of the model: it never fails as a
//! whole. A function it cannot express becomes a visible stub in that
//! emitter's output and a warning in the log.

pub mod java;
pub mod jni;
pub mod json;
pub mod markdown;
pub mod python;
pub mod text;

use std::path::Path;

use crate::error::{GenError, Result};
use crate::model::Api;
use crate::profile::Profile;

/// Everything an emitter needs besides the model.
pub struct Context<'a> {
    pub profile: &'a Profile,
    /// Copyright year printed in banners.
    pub year: u32,
}

/// Trait for turning the model into one output file.
pub trait Emitter {
    fn emit(&self, api: &Api, ctx: &Context) -> String;
    /// Human-readable target name for logs.
    fn target(&self) -> &str;
}

/// Choose the emitter for an output path by its extension.
pub fn create_emitter(path: &Path, profile: &Profile) -> Result<Box<dyn Emitter>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match path.extension().and_then(|e| e.to_str()) {
        Some("java") => Ok(Box::new(java::JavaEmitter)),
        Some("c") => Ok(Box::new(jni::JniEmitter::new(jni::HandleSlot::for_profile(
            profile,
        )))),
        Some("py") => Ok(Box::new(python::PythonEmitter)),
        Some("md") => Ok(Box::new(markdown::MarkdownEmitter {
            jni: file_name.contains("jni"),
        })),
        Some("json") => Ok(Box::new(json::JsonEmitter)),
        _ => Err(GenError::UnknownTarget {
            path: path.to_path_buf(),
        }),
    }
}

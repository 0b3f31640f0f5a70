//! Header-family profile.
//!
//! Everything the generator needs to know about the library besides the
//! header itself: name prefixes, the handle type, whitelists and the names
//! used by each target. The defaults describe libpagekite; a TOML file can
//! override any field.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::GenError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Every exported function name starts with this.
    pub function_prefix: String,
    /// Opaque manager handle returned by constructors.
    pub handle_type: String,
    /// Integer typedefs that signal failure with a negative value.
    pub failure_int_types: Vec<String>,
    /// Export macros allowed in front of the return type.
    pub decl_specifiers: Vec<String>,
    /// Functions whose name contains one of these are internal.
    pub excluded_markers: Vec<String>,
    /// Accepted six-character constant name prefixes.
    pub constant_prefixes: Vec<String>,
    /// Short names of functions that invalidate the handle.
    pub release_functions: Vec<String>,
    /// Short names called, in order, by the Python wrapper's cleanup().
    pub cleanup_functions: Vec<String>,

    /// Headers the native glue includes.
    pub c_includes: Vec<String>,
    pub library: String,
    pub project: String,
    pub java_package: String,
    pub java_class: String,
    pub python_class: String,
    pub python_handle: String,
    pub python_library: String,
    pub doc_title: String,

    pub copyright_holder: String,
    pub copyright_since: u32,
    pub license_lines: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            function_prefix: "pagekite_".to_string(),
            handle_type: "pagekite_mgr".to_string(),
            failure_int_types: vec!["pk_neg_fail".to_string()],
            decl_specifiers: vec!["DECLSPEC_DLL".to_string()],
            excluded_markers: vec!["_relay_".to_string(), "_lua_".to_string()],
            constant_prefixes: ["PK_WIT", "PK_AS_", "PK_STA", "PK_LOG", "PK_VER"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            release_functions: vec!["free".to_string()],
            cleanup_functions: vec!["thread_stop".to_string(), "free".to_string()],
            c_includes: vec!["pagekite.h".to_string(), "pkcommon.h".to_string()],
            library: "pagekite".to_string(),
            project: "libpagekite".to_string(),
            java_package: "net.pagekite.lib".to_string(),
            java_class: "PageKiteAPI".to_string(),
            python_class: "PageKite".to_string(),
            python_handle: "pkm".to_string(),
            python_library: "libpagekite.so".to_string(),
            doc_title: "PageKite API reference manual".to_string(),
            copyright_holder: "The Beanstalks Project ehf.".to_string(),
            copyright_since: 2012,
            license_lines: [
                "This program is free software: you can redistribute it and/or modify it under",
                "the terms  of the  Apache  License 2.0  as published by the  Apache  Software",
                "Foundation.",
                "",
                "This program is distributed in the hope that it will be useful,  but  WITHOUT",
                "ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS",
                "FOR A PARTICULAR PURPOSE.  See the Apache License for more details.",
                "",
                "You should have received a copy of the Apache License along with this program.",
                "If not, see: <http://www.apache.org/licenses/>",
                "",
                "Note: For alternate license terms, see the file COPYING.md.",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        }
    }
}

impl Profile {
    pub fn from_toml(text: &str) -> std::result::Result<Self, GenError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a profile file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// `pagekite_add_kite` → `add_kite`.
    pub fn short_name<'a>(&self, function: &'a str) -> &'a str {
        function
            .strip_prefix(self.function_prefix.as_str())
            .unwrap_or(function)
    }

    pub fn is_excluded(&self, function: &str) -> bool {
        self.excluded_markers.iter().any(|m| function.contains(m.as_str()))
    }

    /// Whitelist check on the first six characters of a constant name.
    pub fn accepts_constant(&self, name: &str) -> bool {
        let head: String = name.chars().take(6).collect();
        self.constant_prefixes.iter().any(|p| *p == head)
    }

    pub fn is_release(&self, function: &str) -> bool {
        let short = self.short_name(function);
        self.release_functions.iter().any(|r| r == short)
    }
}

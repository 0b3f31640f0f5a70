//! Target-agnostic model shared by every emitter.
//!
//! Built once per run from the header text and never mutated afterwards.
//! Everything here serializes, so the model itself can be emitted as JSON
//! and consumed by emitters living outside this crate.

use serde::Serialize;

/// Label used for functions whose doc comment names no category.
pub const NO_CATEGORY: &str = "None";

/// Complete API extracted from one header.
#[derive(Debug, Default, Serialize)]
pub struct Api {
    pub constants: Vec<Constant>,
    pub functions: Vec<FunctionSignature>,
}

/// A whitelisted `#define NAME VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    pub name: String,
    /// Literal text of the value, e.g. `0x0001` or `"141208C"`.
    pub value: String,
}

impl Constant {
    /// True for string literals (anything with a double quote in it).
    pub fn is_string(&self) -> bool {
        self.value.contains('"')
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub c_type: String,
    /// Empty when the header leaves the parameter unnamed.
    pub name: String,
    /// Trailing `/* ... */` on the parameter's line.
    pub doc: Option<String>,
}

impl Parameter {
    /// Declaration as written in the header: `const char* proto`.
    pub fn declaration(&self) -> String {
        if self.name.is_empty() {
            self.c_type.clone()
        } else {
            format!("{} {}", self.c_type, self.name)
        }
    }
}

/// A function prototype accepted by the function extractor.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSignature {
    pub return_type: String,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub raw_doc_comment: Option<String>,
    pub raw_parameter_text: String,
    /// `raw_doc_comment` split into sections.
    pub doc: ParsedDoc,
}

impl FunctionSignature {
    /// Instance methods take the manager handle as their first argument.
    pub fn is_instance_method(&self, handle_type: &str) -> bool {
        self.parameters
            .first()
            .is_some_and(|p| p.c_type == handle_type)
    }

    /// Parameters a caller of a handle-binding wrapper actually passes.
    pub fn public_parameters(&self, handle_type: &str) -> &[Parameter] {
        if self.is_instance_method(handle_type) {
            &self.parameters[1..]
        } else {
            &self.parameters
        }
    }

    /// C prototype without the trailing semicolon, used in stub markers.
    pub fn prototype(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(Parameter::declaration).collect();
        format!("{} {}({})", self.return_type, self.name, params.join(", "))
    }
}

/// One `Key: text` section of a doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: String,
    pub text: String,
}

/// Doc comment sections in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedDoc {
    sections: Vec<Section>,
}

impl ParsedDoc {
    /// Add a section. A repeated key replaces the earlier text but keeps
    /// its position.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        match self.sections.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.text = text,
            None => self.sections.push(Section { key, text }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.text.as_str())
    }

    /// Grouping label: the first key that does not mention "returns".
    pub fn category(&self) -> &str {
        self.sections
            .iter()
            .map(|s| s.key.as_str())
            .find(|k| !k.to_lowercase().contains("returns"))
            .unwrap_or(NO_CATEGORY)
    }

    /// Text of the category section, empty if there is none.
    pub fn body(&self) -> &str {
        self.get(self.category()).unwrap_or("")
    }

    /// First of `keys` present in the comment.
    pub fn returns(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }
}

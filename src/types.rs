//! C type classification.
//!
//! The header family only uses a handful of types. Each emitter maps the
//! closed [`ApiType`] set to its own FFI spelling; anything outside the set
//! is reported per function so the emitter can stub that one function.

use crate::error::{GenError, Result};
use crate::model::{FunctionSignature, Parameter};
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiType {
    /// The opaque manager handle.
    Handle,
    Void,
    Int,
    UnsignedInt,
    /// An int typedef where negative means failure.
    FailureInt,
    /// `char*`
    Str,
    /// `const char*`
    ConstStr,
}

impl ApiType {
    pub fn is_string(self) -> bool {
        matches!(self, ApiType::Str | ApiType::ConstStr)
    }
}

pub fn classify(c_type: &str, profile: &Profile) -> Result<ApiType> {
    let c_type = c_type.trim();
    if c_type == profile.handle_type {
        return Ok(ApiType::Handle);
    }
    if profile.failure_int_types.iter().any(|t| t == c_type) {
        return Ok(ApiType::FailureInt);
    }
    let compact: String = c_type.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
        "void" => Ok(ApiType::Void),
        "int" => Ok(ApiType::Int),
        "unsigned" | "unsignedint" => Ok(ApiType::UnsignedInt),
        "char*" => Ok(ApiType::Str),
        "constchar*" | "charconst*" => Ok(ApiType::ConstStr),
        _ => Err(GenError::UnknownType {
            c_type: c_type.to_string(),
        }),
    }
}

/// How a function relates to the manager handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// No handle argument, returns a new handle.
    Constructor,
    /// Handle as the first argument.
    Instance,
    /// Neither; callable without a live handle.
    Static,
}

/// A function whose every type is understood.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub func: &'a FunctionSignature,
    pub returns: ApiType,
    pub kind: Kind,
    /// Parameters after the handle, each with its classified type.
    pub params: Vec<(ApiType, &'a Parameter)>,
}

/// Classify the return type and every public parameter of `func`.
pub fn resolve<'a>(func: &'a FunctionSignature, profile: &Profile) -> Result<Resolved<'a>> {
    let returns = classify(&func.return_type, profile)?;
    let instance = func.is_instance_method(&profile.handle_type);
    let offset = usize::from(instance);

    let mut params = Vec::new();
    for (i, param) in func.public_parameters(&profile.handle_type).iter().enumerate() {
        let ty = classify(&param.c_type, profile)?;
        let position = i + offset + 1;
        if ty == ApiType::Handle {
            return Err(GenError::HandleParameter {
                function: func.name.clone(),
                position,
            });
        }
        if param.name.is_empty() {
            return Err(GenError::UnnamedParameter {
                function: func.name.clone(),
                position,
            });
        }
        params.push((ty, param));
    }

    let kind = match (instance, returns) {
        (true, _) => Kind::Instance,
        (false, ApiType::Handle) => Kind::Constructor,
        (false, _) => Kind::Static,
    };

    Ok(Resolved {
        func,
        returns,
        kind,
        params,
    })
}

//! Generator error types.

use std::path::PathBuf;

/// Errors raised while turning the model into target code.
///
/// The per-function variants are recoverable: emitters catch them and
/// write a stub marker instead. `UnknownTarget` and `Profile` are fatal.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A C type outside the supported set.
    #[error("unknown type: {c_type}")]
    UnknownType { c_type: String },

    /// A parameter with no name where the target needs one.
    #[error("parameter {position} of {function} has no name")]
    UnnamedParameter { function: String, position: usize },

    /// A manager handle anywhere but the first parameter.
    #[error("parameter {position} of {function} passes a manager handle")]
    HandleParameter { function: String, position: usize },

    /// No emitter is registered for the output file's extension.
    #[error("unrecognized output target: {}", path.display())]
    UnknownTarget { path: PathBuf },

    /// Invalid profile file.
    #[error("profile parse error: {0}")]
    Profile(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

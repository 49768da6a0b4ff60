//! Generation-time errors.
//!
//! These are configuration-shape problems in the input ABI. None of them is
//! recoverable: generation aborts and surfaces the offending entity.

use thiserror::Error;

/// Identifies the ABI entity being expanded, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// The contract name.
    pub contract: String,
    /// The function or event name within the contract.
    pub entity: String,
}

impl Origin {
    pub(crate) fn new(contract: &str, entity: &str) -> Self {
        Self { contract: contract.to_owned(), entity: entity.to_owned() }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.contract, self.entity)
    }
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum Error {
    /// The type is part of the ABI grammar but deliberately not supported:
    /// fixed-point numbers and function-typed parameters.
    #[error("unsupported parameter type `{kind}` in {origin}: {reason}")]
    UnsupportedType {
        /// The raw type descriptor.
        kind: String,
        /// The entity the parameter belongs to.
        origin: Origin,
        /// Why the type is rejected.
        reason: &'static str,
    },

    /// The type string does not match the ABI type grammar at all.
    #[error("unrecognized parameter type `{kind}` in {origin}")]
    UnrecognizedType {
        /// The raw type descriptor.
        kind: String,
        /// The entity the parameter belongs to.
        origin: Origin,
    },

    /// A function has two or more outputs but not all of them are named, so
    /// no record-shaped return type can be synthesized.
    #[error("function {origin} has multiple return values but not all of them are named")]
    AmbiguousReturnShape {
        /// The offending function.
        origin: Origin,
    },

    /// A `tuple`-typed parameter is missing its component list.
    #[error("tuple type `{kind}` in {origin} is missing its components")]
    MissingComponents {
        /// The raw type descriptor.
        kind: String,
        /// The entity the parameter belongs to.
        origin: Origin,
    },

    /// The compiler output JSON could not be parsed.
    #[error("failed to parse compiler output: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The assembled bindings failed to parse as a Rust file. This indicates
    /// a bug in the expansion passes, not in the input.
    #[error("generated bindings are not valid Rust: {0}")]
    Render(#[from] syn::Error),
}

/// Convenience alias used throughout the expansion passes.
pub type Result<T, E = Error> = std::result::Result<T, E>;

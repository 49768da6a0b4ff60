#![deny(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod contract;
mod emit;
pub mod error;
pub mod rawabi;
/// The runtime support emitted verbatim into every generated document,
/// compiled here as well so its behavior is unit-testable.
pub mod runtime;
mod util;

pub use crate::error::{Error, Origin, Result};
pub use crate::rawabi::CompilerOutput;
pub use crate::util::keccak256;

use std::path::Path;

/// Generates statically typed bindings from a compiler output document.
///
/// `Binder` is the entry point of the crate: construct it from a parsed
/// [`CompilerOutput`] or straight from JSON, then call [`generate`] to
/// produce the bindings document.
///
/// [`generate`]: Binder::generate
#[derive(Debug, Clone)]
pub struct Binder {
    output: CompilerOutput,
}

impl Binder {
    /// Creates a binder over an already parsed compiler output.
    pub fn new(output: CompilerOutput) -> Self {
        Self { output }
    }

    /// Parses a compiler output JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Reads and parses a compiler output JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Generates the bindings document.
    ///
    /// The output is deterministic: the same compiler output always renders
    /// to the same source text, so generated files diff cleanly under
    /// version control.
    pub fn generate(&self) -> Result<GeneratedBindings> {
        let expanded = contract::expand_compiler_output(&self.output)?;
        tracing::debug!(contracts = expanded.contracts.len(), "expanded compiler output");
        Ok(GeneratedBindings { source: emit::render(&expanded)? })
    }
}

/// A rendered bindings document, ready to be written out.
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    source: String,
}

impl GeneratedBindings {
    /// The generated source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consumes the bindings, returning the source text.
    pub fn into_source(self) -> String {
        self.source
    }

    /// Writes the source text to `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.source)?;
        Ok(())
    }
}

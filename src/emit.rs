//! Assembles and renders the final generated document.
//!
//! A document is three parts concatenated in order: a header comment, the
//! verbatim runtime support text, and the pretty-printed dynamic items (the
//! event registry plus one module per contract). The runtime text is the
//! source of [`crate::runtime`] itself, so the emitted copy always matches
//! the behavior the generator was tested against.

use crate::contract::ExpandedOutput;
use crate::error::Result;
use quote::quote;

const HEADER: &str = "\
// @generated contract bindings. Do not edit by hand.
//
// This file is self-contained apart from two crates the enclosing project
// must declare: `async-trait` and `thiserror`.

";

const RUNTIME: &str = include_str!("runtime.rs");

/// Renders the expanded output to a single formatted source document.
pub(crate) fn render(expanded: &ExpandedOutput) -> Result<String> {
    let registry = &expanded.registry;
    let contracts = &expanded.contracts;
    let dynamic = quote! {
        /// Every event declared by the bound contracts, keyed by topic hash.
        pub static EVENT_DESCRIPTIONS: &[EventDescription] = &[ #( #registry ),* ];

        #( #contracts )*
    };
    let file = syn::parse2::<syn::File>(dynamic)?;
    let rendered = prettyplease::unparse(&file);

    let mut document = String::with_capacity(HEADER.len() + RUNTIME.len() + rendered.len() + 2);
    document.push_str(HEADER);
    document.push_str(runtime_text());
    document.push('\n');
    document.push_str(&rendered);
    Ok(document)
}

/// The runtime text without its test module, which only makes sense when the
/// runtime is compiled as part of this crate.
fn runtime_text() -> &'static str {
    RUNTIME.split("#[cfg(test)]").next().unwrap_or(RUNTIME).trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::expand_compiler_output;
    use crate::rawabi::CompilerOutput;

    fn render_json(json: &str) -> String {
        let output: CompilerOutput = serde_json::from_str(json).unwrap();
        render(&expand_compiler_output(&output).unwrap()).unwrap()
    }

    #[test]
    fn runtime_text_carries_no_test_module() {
        let text = runtime_text();
        assert!(text.contains("pub struct Contract"));
        assert!(!text.contains("mod tests"));
    }

    #[test]
    fn rendered_document_is_parseable_rust() {
        let document = render_json(
            r#"{"contracts":{"Token.sol":{"Token":{"abi":[
                {"type":"function","name":"transfer","constant":false,"payable":false,
                 "inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"}],
                 "outputs":[{"name":"","type":"bool"}]},
                {"type":"event","name":"Transfer","anonymous":false,"inputs":[
                 {"name":"from","type":"address","indexed":true},
                 {"name":"to","type":"address","indexed":true},
                 {"name":"value","type":"uint256","indexed":false}]}]}}}}"#,
        );
        assert!(document.starts_with("// @generated"));
        assert!(document.contains("pub static EVENT_DESCRIPTIONS"));
        assert!(document.contains("pub mod token"));
        syn::parse_file(&document).unwrap();
    }

    #[test]
    fn empty_output_still_renders_the_runtime_and_an_empty_registry() {
        let document = render_json(r#"{"contracts":{}}"#);
        assert!(document.contains("pub trait Dependencies"));
        assert!(document.contains("EVENT_DESCRIPTIONS: &[EventDescription] = &[]"));
        syn::parse_file(&document).unwrap();
    }
}

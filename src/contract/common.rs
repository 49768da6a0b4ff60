//! Canonical signatures, selectors and topic hashes, plus the shared
//! expansion of parameter-description literals embedded in generated code.

use crate::error::{Error, Origin, Result};
use crate::rawabi::{AbiEventParameter, AbiParameter};
use crate::util;
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Renders `name(type1,type2,...)` in the canonical form the chain hashes.
///
/// Tuple-headed types are expanded recursively into parenthesized component
/// lists with their array suffixes preserved, never abbreviated as `tuple`:
/// the resulting hash is consensus-critical metadata, not a display string.
pub(crate) fn canonical_signature(
    name: &str,
    parameters: &[AbiParameter],
    origin: &Origin,
) -> Result<String> {
    let types = parameters
        .iter()
        .map(|parameter| canonical_type(parameter, origin))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("{}({})", name, types.join(",")))
}

fn canonical_type(parameter: &AbiParameter, origin: &Origin) -> Result<String> {
    match parameter.kind.strip_prefix("tuple") {
        Some(suffix) => {
            if parameter.components.is_empty() {
                return Err(Error::MissingComponents {
                    kind: parameter.kind.clone(),
                    origin: origin.clone(),
                });
            }
            let components = parameter
                .components
                .iter()
                .map(|component| canonical_type(component, origin))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("({}){}", components.join(","), suffix))
        }
        None => Ok(parameter.kind.clone()),
    }
}

/// The first 4 bytes of the Keccak-256 hash of the canonical signature,
/// used to dispatch calls.
pub(crate) fn selector(signature: &str) -> [u8; 4] {
    let hash = util::keccak256(signature);
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// The full Keccak-256 hash of the canonical signature, used as the first
/// log topic identifying which event fired.
pub(crate) fn topic_hash(signature: &str) -> [u8; 32] {
    util::keccak256(signature)
}

/// Expands a byte slice to an array literal of unsuffixed byte literals,
/// e.g. `[169, 5, 156, 187]`.
pub(crate) fn expand_bytes(bytes: &[u8]) -> TokenStream {
    let bytes = bytes.iter().map(|byte| Literal::u8_unsuffixed(*byte));
    quote!([ #( #bytes ),* ])
}

/// Expands one parameter description to the const literal the generated
/// method embeds for the external codec.
pub(crate) fn expand_parameter_description(parameter: &AbiParameter) -> TokenStream {
    let name = &parameter.name;
    let kind = &parameter.kind;
    let components = parameter.components.iter().map(expand_parameter_description);
    quote! {
        ParameterDescription {
            name: #name,
            kind: #kind,
            components: &[ #( #components ),* ],
        }
    }
}

/// Expands one event parameter description, carrying the `indexed` flag.
pub(crate) fn expand_event_parameter_description(parameter: &AbiEventParameter) -> TokenStream {
    let name = &parameter.name;
    let kind = &parameter.kind;
    let indexed = parameter.indexed;
    let components = parameter.components.iter().map(expand_parameter_description);
    quote! {
        EventParameterDescription {
            name: #name,
            kind: #kind,
            components: &[ #( #components ),* ],
            indexed: #indexed,
        }
    }
}

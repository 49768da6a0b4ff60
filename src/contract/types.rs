//! Types expansion: the mapping from raw ABI type descriptors to Rust types.
//!
//! The grammar is an ordered list of pattern rules evaluated top to bottom,
//! recursing through array suffixes and tuple components. The mapping itself
//! is a pure function into a small [`TypeExpression`] AST; rendering to
//! tokens is separate so the rules stay unit-testable without string-diffing
//! generated source.

use crate::error::{Error, Origin, Result};
use crate::rawabi::{AbiEventParameter, AbiParameter};
use crate::util;
use once_cell::sync::Lazy;
use proc_macro2::TokenStream;
use quote::quote;
use regex::Regex;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(u?)int(\d*)$").unwrap());
static FIXED_BYTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bytes(\d+)$").unwrap());
static ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\[(\d*)\]$").unwrap());
static FIXED_POINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^u?fixed\d+x\d+$").unwrap());

/// Integer widths up to this many bits fit a native integer; wider ones use
/// the injected large-integer representation.
pub(crate) const NATIVE_INTEGER_BITS: usize = 52;

/// The Rust-facing shape of one ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeExpression {
    /// An unsigned integer. `None` means the descriptor carried no width.
    Uint(Option<usize>),
    /// A signed integer. `None` means the descriptor carried no width.
    Int(Option<usize>),
    /// A 20-byte address.
    Address,
    /// A boolean.
    Bool,
    /// A fixed-width byte array of 1..=32 bytes.
    FixedBytes(usize),
    /// A text string.
    String,
    /// A variable-length byte string.
    Bytes,
    /// A fixed or dynamic array; both render as a vector.
    Array(Box<TypeExpression>),
    /// A tuple: the recursive mapping of each component, keyed by name.
    /// Rendered positionally; the names feed struct synthesis elsewhere.
    Record(Vec<(String, TypeExpression)>),
}

impl TypeExpression {
    /// Whether the rendered type mentions the injected large-integer
    /// parameter `L`.
    pub(crate) fn needs_large_integer(&self) -> bool {
        match self {
            TypeExpression::Uint(Some(bits)) | TypeExpression::Int(Some(bits)) => {
                *bits > NATIVE_INTEGER_BITS
            }
            TypeExpression::Array(inner) => inner.needs_large_integer(),
            TypeExpression::Record(fields) => {
                fields.iter().any(|(_, field)| field.needs_large_integer())
            }
            _ => false,
        }
    }

    /// Renders the expression as a Rust type. Purely mechanical: every
    /// decision was taken during mapping.
    pub(crate) fn expand(&self) -> TokenStream {
        match self {
            TypeExpression::Uint(None) => quote!(u64),
            TypeExpression::Int(None) => quote!(i64),
            TypeExpression::Uint(Some(bits)) => {
                let name = util::ident(&format!("Uint{bits}"));
                if *bits > NATIVE_INTEGER_BITS {
                    quote!(#name<L>)
                } else {
                    quote!(#name)
                }
            }
            TypeExpression::Int(Some(bits)) => {
                let name = util::ident(&format!("Int{bits}"));
                if *bits > NATIVE_INTEGER_BITS {
                    quote!(#name<L>)
                } else {
                    quote!(#name)
                }
            }
            TypeExpression::Address => quote!(Address),
            TypeExpression::Bool => quote!(bool),
            TypeExpression::FixedBytes(width) => {
                let name = util::ident(&format!("Bytes{width}"));
                quote!(#name)
            }
            TypeExpression::String => quote!(::std::string::String),
            TypeExpression::Bytes => quote!(Bytes),
            TypeExpression::Array(inner) => {
                let inner = inner.expand();
                quote!(::std::vec::Vec<#inner>)
            }
            TypeExpression::Record(fields) => {
                let fields = fields.iter().map(|(_, field)| field.expand());
                // trailing comma keeps the single-field case a real tuple
                quote!(( #( #fields, )* ))
            }
        }
    }
}

/// Maps one function parameter to its Rust type expression.
pub(crate) fn map_type(parameter: &AbiParameter, origin: &Origin) -> Result<TypeExpression> {
    map_raw(&parameter.kind, &parameter.components, origin)
}

/// Maps one event parameter, applying the indexed canonicalization rule:
/// dynamic indexed values are present in the log only as their 32-byte hash,
/// so they surface as an opaque `Bytes32` rather than their declared type.
pub(crate) fn map_event_type(
    parameter: &AbiEventParameter,
    origin: &Origin,
) -> Result<TypeExpression> {
    if parameter.indexed && is_dynamic(&parameter.kind) {
        return Ok(TypeExpression::FixedBytes(32));
    }
    map_raw(&parameter.kind, &parameter.components, origin)
}

/// Whether an indexed parameter of this type is stored hashed in its topic.
pub(crate) fn is_dynamic(kind: &str) -> bool {
    kind == "string" || kind == "bytes" || kind.starts_with("tuple") || kind.ends_with("[]")
}

fn map_raw(kind: &str, components: &[AbiParameter], origin: &Origin) -> Result<TypeExpression> {
    if let Some(captures) = INTEGER.captures(kind) {
        let signed = captures[1].is_empty();
        // an absent width is not expected in practice; it maps to the native
        // integer rather than crashing the matcher
        let bits = captures[2].parse::<usize>().ok();
        return Ok(if signed { TypeExpression::Int(bits) } else { TypeExpression::Uint(bits) });
    }
    if kind == "address" {
        return Ok(TypeExpression::Address);
    }
    if kind == "bool" {
        return Ok(TypeExpression::Bool);
    }
    if let Some(captures) = FIXED_BYTES.captures(kind) {
        let width = captures[1].parse::<usize>().unwrap_or_default();
        if !(1..=32).contains(&width) {
            return Err(Error::UnrecognizedType { kind: kind.to_owned(), origin: origin.clone() });
        }
        return Ok(TypeExpression::FixedBytes(width));
    }
    if kind == "string" {
        return Ok(TypeExpression::String);
    }
    if kind == "bytes" {
        return Ok(TypeExpression::Bytes);
    }
    if let Some(captures) = ARRAY.captures(kind) {
        // the lazy match peels the outermost suffix: `uint8[3][]` recurses
        // on `uint8[3]`
        let element = map_raw(&captures[1], components, origin)?;
        return Ok(TypeExpression::Array(Box::new(element)));
    }
    if kind == "tuple" {
        if components.is_empty() {
            return Err(Error::MissingComponents { kind: kind.to_owned(), origin: origin.clone() });
        }
        let fields = components
            .iter()
            .map(|component| Ok((component.name.clone(), map_type(component, origin)?)))
            .collect::<Result<Vec<_>>>()?;
        return Ok(TypeExpression::Record(fields));
    }
    if FIXED_POINT.is_match(kind) {
        return Err(Error::UnsupportedType {
            kind: kind.to_owned(),
            origin: origin.clone(),
            reason: "fixed point parameters are not supported",
        });
    }
    if kind == "function" {
        return Err(Error::UnsupportedType {
            kind: kind.to_owned(),
            origin: origin.clone(),
            reason: "function parameters are not supported",
        });
    }
    Err(Error::UnrecognizedType { kind: kind.to_owned(), origin: origin.clone() })
}

/// The synthesized shape of a function's return value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReturnShape {
    /// No outputs.
    Unit,
    /// Exactly one output; an anonymous return is fine here.
    Single(TypeExpression),
    /// Two or more outputs, all named: a record keyed by output name.
    Record(Vec<(String, TypeExpression)>),
}

/// Maps a function's output list to its return shape.
///
/// Multi-value outputs require every output to be named, otherwise the
/// record cannot be keyed and generation fails, at generation time rather
/// than call time.
pub(crate) fn map_return_shape(outputs: &[AbiParameter], origin: &Origin) -> Result<ReturnShape> {
    match outputs {
        [] => Ok(ReturnShape::Unit),
        [single] => Ok(ReturnShape::Single(map_type(single, origin)?)),
        outputs => {
            if outputs.iter().any(|output| output.name.is_empty()) {
                return Err(Error::AmbiguousReturnShape { origin: origin.clone() });
            }
            let fields = outputs
                .iter()
                .map(|output| Ok((output.name.clone(), map_type(output, origin)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(ReturnShape::Record(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin::new("Token", "transfer")
    }

    fn parameter(kind: &str) -> AbiParameter {
        AbiParameter { name: "p".to_owned(), kind: kind.to_owned(), components: Vec::new() }
    }

    fn map(kind: &str) -> Result<TypeExpression> {
        map_type(&parameter(kind), &origin())
    }

    #[test]
    fn maps_integers_around_the_native_cutoff() {
        assert_eq!(map("uint8").unwrap(), TypeExpression::Uint(Some(8)));
        assert_eq!(map("uint48").unwrap().expand().to_string(), quote!(Uint48).to_string());
        assert_eq!(map("uint56").unwrap().expand().to_string(), quote!(Uint56<L>).to_string());
        assert_eq!(map("int256").unwrap().expand().to_string(), quote!(Int256<L>).to_string());
        assert!(map("uint48").map(|t| !t.needs_large_integer()).unwrap());
        assert!(map("uint56").map(|t| t.needs_large_integer()).unwrap());
    }

    #[test]
    fn absent_width_maps_to_native_integer() {
        assert_eq!(map("uint").unwrap().expand().to_string(), quote!(u64).to_string());
        assert_eq!(map("int").unwrap().expand().to_string(), quote!(i64).to_string());
    }

    #[test]
    fn maps_simple_types() {
        assert_eq!(map("address").unwrap(), TypeExpression::Address);
        assert_eq!(map("bool").unwrap(), TypeExpression::Bool);
        assert_eq!(map("string").unwrap(), TypeExpression::String);
        assert_eq!(map("bytes").unwrap(), TypeExpression::Bytes);
        assert_eq!(map("bytes32").unwrap(), TypeExpression::FixedBytes(32));
        assert_eq!(map("bytes1").unwrap(), TypeExpression::FixedBytes(1));
    }

    #[test]
    fn rejects_out_of_range_byte_widths() {
        assert!(matches!(map("bytes0"), Err(Error::UnrecognizedType { .. })));
        assert!(matches!(map("bytes33"), Err(Error::UnrecognizedType { .. })));
    }

    #[test]
    fn arrays_peel_the_outermost_suffix() {
        assert_eq!(
            map("uint256[3]").unwrap(),
            TypeExpression::Array(Box::new(TypeExpression::Uint(Some(256)))),
        );
        assert_eq!(
            map("uint8[3][]").unwrap(),
            TypeExpression::Array(Box::new(TypeExpression::Array(Box::new(
                TypeExpression::Uint(Some(8))
            )))),
        );
        assert_eq!(
            map("address[]").unwrap().expand().to_string(),
            quote!(::std::vec::Vec<Address>).to_string(),
        );
    }

    #[test]
    fn tuples_recurse_over_components() {
        let mut tuple = parameter("tuple");
        tuple.components = vec![parameter("uint256"), parameter("address")];
        let expression = map_type(&tuple, &origin()).unwrap();
        assert!(expression.needs_large_integer());
        assert_eq!(
            expression.expand().to_string(),
            quote!((Uint256<L>, Address,)).to_string(),
        );

        let mut array = parameter("tuple[]");
        array.components = vec![parameter("bool")];
        assert_eq!(
            map_type(&array, &origin()).unwrap().expand().to_string(),
            quote!(::std::vec::Vec<(bool,)>).to_string(),
        );
    }

    #[test]
    fn tuple_without_components_is_malformed() {
        assert!(matches!(map("tuple"), Err(Error::MissingComponents { .. })));
    }

    #[test]
    fn rejects_fixed_point_and_function_types() {
        assert!(matches!(map("fixed128x18"), Err(Error::UnsupportedType { .. })));
        assert!(matches!(map("ufixed32x1"), Err(Error::UnsupportedType { .. })));
        assert!(matches!(map("function"), Err(Error::UnsupportedType { .. })));
    }

    #[test]
    fn garbage_is_unrecognized_with_context() {
        match map("struct Thing") {
            Err(Error::UnrecognizedType { kind, origin }) => {
                assert_eq!(kind, "struct Thing");
                assert_eq!(origin.contract, "Token");
                assert_eq!(origin.entity, "transfer");
            }
            other => panic!("expected UnrecognizedType, got {other:?}"),
        }
    }

    #[test]
    fn indexed_dynamic_event_parameters_surface_as_bytes32() {
        let event_parameter = |kind: &str, indexed: bool| AbiEventParameter {
            name: "p".to_owned(),
            kind: kind.to_owned(),
            components: Vec::new(),
            indexed,
        };
        // indexed value type keeps its declared mapping
        assert_eq!(
            map_event_type(&event_parameter("uint256", true), &origin()).unwrap(),
            TypeExpression::Uint(Some(256)),
        );
        // indexed dynamic types collapse to the opaque digest
        for kind in ["string", "bytes", "uint256[]"] {
            assert_eq!(
                map_event_type(&event_parameter(kind, true), &origin()).unwrap(),
                TypeExpression::FixedBytes(32),
            );
        }
        // clearing the flag restores the declared mapping
        assert_eq!(
            map_event_type(&event_parameter("string", false), &origin()).unwrap(),
            TypeExpression::String,
        );
    }

    #[test]
    fn return_shapes() {
        let named = |name: &str, kind: &str| AbiParameter {
            name: name.to_owned(),
            kind: kind.to_owned(),
            components: Vec::new(),
        };
        assert_eq!(map_return_shape(&[], &origin()).unwrap(), ReturnShape::Unit);
        assert_eq!(
            map_return_shape(&[named("", "uint256")], &origin()).unwrap(),
            ReturnShape::Single(TypeExpression::Uint(Some(256))),
        );
        assert!(matches!(
            map_return_shape(&[named("a", "uint256"), named("b", "bool")], &origin()).unwrap(),
            ReturnShape::Record(_),
        ));
        assert!(matches!(
            map_return_shape(&[named("a", "uint256"), named("", "bool")], &origin()),
            Err(Error::AmbiguousReturnShape { .. }),
        ));
    }
}

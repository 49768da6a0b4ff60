//! Identifier and hashing helpers shared by the expansion passes.

use inflector::Inflector;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use tiny_keccak::{Hasher, Keccak};

/// Compute the Keccak-256 hash of the input bytes.
///
/// This is the hash primitive behind selectors and event topic hashes.
pub fn keccak256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);
    output
}

/// Creates a new Ident with the given string at [`Span::call_site`].
///
/// # Panics
///
/// If the input string is not a legal identifier.
pub(crate) fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Expands an identifier string into a token, appending `_` if the identifier
/// is a reserved keyword.
///
/// Parsing keywords like `self` fails, in which case we add an underscore.
pub(crate) fn safe_ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| ident(&format!("{name}_")))
}

/// Respects identifier rules: an identifier must not start with a numeric
/// char.
fn safe_identifier_name(name: String) -> String {
    if name.starts_with(char::is_numeric) {
        format!("_{name}")
    } else {
        name
    }
}

/// Converts a contract or event name to a `PascalCase` type ident.
pub(crate) fn safe_pascal_case_ident(name: &str) -> Ident {
    safe_ident(&safe_identifier_name(name.to_pascal_case()))
}

/// Converts a contract name to a valid snake case module name.
pub(crate) fn safe_module_name(name: &str) -> Ident {
    // handle reserved words used as contract names (eg Enum)
    safe_ident(&safe_identifier_name(name.to_snake_case()))
}

/// Converts a function name to a snake case method ident, optionally with a
/// suffix marking local-call semantics.
pub(crate) fn method_ident(name: &str, suffix: &str) -> Ident {
    safe_ident(&format!("{}{suffix}", safe_identifier_name(name.to_snake_case())))
}

/// Expands a positional parameter name that may be empty.
///
/// Note that this expands the parameter name with `safe_ident`, meaning that
/// identifiers that are reserved keywords get `_` appended to them.
pub(crate) fn expand_input_name(index: usize, name: &str) -> TokenStream {
    let name_str = match name {
        "" => format!("p{index}"),
        n => n.to_snake_case(),
    };
    let name = safe_ident(&name_str);

    quote! { #name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_known_vector() {
        // selector preimage of the canonical ERC-20 transfer
        let hash = keccak256("transfer(address,uint256)");
        assert_eq!(&hash[..4], [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(
            hex::encode(keccak256("Transfer(address,address,uint256)")),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
        );
    }

    #[test]
    fn input_name_to_ident_empty() {
        assert_eq!(expand_input_name(2, "").to_string(), "p2");
    }

    #[test]
    fn input_name_to_ident_keyword() {
        assert_eq!(expand_input_name(0, "self").to_string(), "self_");
    }

    #[test]
    fn input_name_to_ident_snake_case() {
        assert_eq!(expand_input_name(0, "CamelCase1").to_string(), "camel_case_1");
    }

    #[test]
    fn module_and_type_names() {
        assert_eq!(safe_module_name("Valid").to_string(), "valid");
        assert_eq!(safe_module_name("Enum").to_string(), "enum_");
        assert_eq!(safe_module_name("2Two").to_string(), "_2_two");
        assert_eq!(method_ident("balanceOf", "_call").to_string(), "balance_of_call");
    }
}

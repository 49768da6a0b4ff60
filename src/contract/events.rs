//! Events expansion: per-event nominal decoded types and the registry
//! entries that let the runtime recognize logs by topic hash.

use super::{common, types, Context};
use crate::error::{Origin, Result};
use crate::rawabi::{AbiEvent, AbiEventParameter, AbiParameter};
use crate::util;
use proc_macro2::TokenStream;
use quote::quote;

/// One event's contribution to the global registry.
pub(crate) struct EventRegistryEntry {
    /// The canonical signature, for diagnostics.
    pub signature: String,
    /// The topic hash the entry is keyed by.
    pub hash: [u8; 32],
    /// The `EventDescription` literal.
    pub tokens: TokenStream,
}

impl Context<'_> {
    /// Expands each named event to a nominal struct plus its registry entry.
    ///
    /// Unnamed events contribute nothing; anonymous events still get an
    /// entry (their logs simply never carry the identifying topic).
    pub(crate) fn expand_events(&self) -> Result<(TokenStream, Vec<EventRegistryEntry>)> {
        let mut declarations = Vec::new();
        let mut entries = Vec::new();
        for event in self.abi.events().filter(|event| !event.name.is_empty()) {
            let origin = Origin::new(self.name, &event.name);
            let inputs: Vec<AbiParameter> =
                event.inputs.iter().map(AbiEventParameter::as_parameter).collect();
            let signature = common::canonical_signature(&event.name, &inputs, &origin)?;
            let hash = common::topic_hash(&signature);
            tracing::trace!(%signature, hash = %hex::encode(hash), "registering event");
            declarations.push(self.expand_event(event, &signature, hash, &origin)?);
            entries.push(EventRegistryEntry {
                tokens: expand_event_description(event, &signature, hash),
                signature,
                hash,
            });
        }
        Ok((quote!( #( #declarations )* ), entries))
    }

    /// Expands the nominal decoded type for one event: a struct with the
    /// indexed-canonicalized field types and a `TryFrom<DecodedEvent>` impl
    /// pulling each field out of the decoded map by its declared name.
    fn expand_event(
        &self,
        event: &AbiEvent,
        signature: &str,
        hash: [u8; 32],
        origin: &Origin,
    ) -> Result<TokenStream> {
        let struct_name = util::safe_pascal_case_ident(&event.name);

        let mut field_idents = Vec::with_capacity(event.inputs.len());
        let mut field_types = Vec::with_capacity(event.inputs.len());
        let mut field_keys = Vec::with_capacity(event.inputs.len());
        let mut needs_large = false;
        for (index, input) in event.inputs.iter().enumerate() {
            let expression = types::map_event_type(input, origin)?;
            needs_large |= expression.needs_large_integer();
            field_idents.push(util::expand_input_name(index, &input.name));
            field_types.push(expression.expand());
            field_keys.push(input.name.clone());
        }

        let generics = if needs_large { quote!(<L>) } else { quote!() };
        let doc = format!(
            "Decoded `{signature}` event (topic hash `0x{}`).",
            hex::encode(hash),
        );
        let event_binding = if event.inputs.is_empty() { quote!(_event) } else { quote!(mut event) };
        let fields = field_idents.iter().zip(&field_keys).map(|(ident, key)| {
            quote! {
                #ident: FromValue::from_value(
                    event
                        .parameters
                        .remove(#key)
                        .ok_or_else(|| ValueError::missing(#key))?,
                )?
            }
        });

        Ok(quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, PartialEq)]
            pub struct #struct_name #generics {
                #( pub #field_idents: #field_types, )*
            }

            impl<L> ::std::convert::TryFrom<DecodedEvent<L> > for #struct_name #generics {
                type Error = ValueError;

                fn try_from(#event_binding: DecodedEvent<L>) -> ::std::result::Result<Self, ValueError> {
                    Ok(Self { #( #fields, )* })
                }
            }
        })
    }
}

fn expand_event_description(event: &AbiEvent, signature: &str, hash: [u8; 32]) -> TokenStream {
    let name = &event.name;
    let hash = common::expand_bytes(&hash);
    let parameters = event.inputs.iter().map(common::expand_event_parameter_description);
    quote! {
        EventDescription {
            name: #name,
            signature: #signature,
            hash: #hash,
            parameters: &[ #( #parameters ),* ],
        }
    }
}

//! Methods expansion: the local (read) and remote (write) binding surface
//! for each callable function.

use super::types::{self, ReturnShape};
use super::{common, Context};
use crate::error::{Origin, Result};
use crate::rawabi::AbiFunction;
use crate::util;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;

impl Context<'_> {
    /// Expands all method implementations plus the return structs they need.
    ///
    /// Overloads are not supported: within one contract only the first
    /// function of a given name (in declaration order) is bound; later
    /// same-named entries are dropped without error.
    pub(crate) fn expand_methods(&self) -> Result<(TokenStream, TokenStream)> {
        let mut methods = Vec::new();
        let mut structs = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for function in self.abi.functions() {
            if !seen.insert(function.name.as_str()) {
                tracing::warn!(
                    contract = self.name,
                    function = %function.name,
                    "dropping overloaded function; only the first declaration is bound"
                );
                continue;
            }
            let (method, return_struct) = self.expand_function(function)?;
            methods.push(method);
            structs.extend(return_struct);
        }
        Ok((quote!( #( #methods )* ), quote!( #( #structs )* )))
    }

    /// Expands one function: always a local (read) method, plus a remote
    /// (write) method when the function is state-changing, plus a return
    /// struct when the function has two or more outputs.
    fn expand_function(
        &self,
        function: &AbiFunction,
    ) -> Result<(TokenStream, Option<TokenStream>)> {
        let origin = Origin::new(self.name, &function.name);
        let signature = common::canonical_signature(&function.name, &function.inputs, &origin)?;
        let selector = common::expand_bytes(&common::selector(&signature));
        let selector_hex = hex::encode(common::selector(&signature));

        let mut parameters = Vec::with_capacity(function.inputs.len());
        let mut values = Vec::with_capacity(function.inputs.len());
        for (index, input) in function.inputs.iter().enumerate() {
            let ident = util::expand_input_name(index, &input.name);
            let kind = types::map_type(input, &origin)?.expand();
            values.push(quote!(IntoValue::into_value(#ident)));
            parameters.push(quote!(#ident: #kind));
        }

        // payable functions take the attached value as an ordinary optional
        // parameter; non-payable signatures simply omit it
        let (attached_parameter, attached_value) = if function.payable {
            (Some(quote!(attached_value: ::std::option::Option<Uint256<L> >)), quote!(attached_value))
        } else {
            (None, quote!(::std::option::Option::None))
        };

        let input_descriptions: Vec<_> =
            function.inputs.iter().map(common::expand_parameter_description).collect();
        let output_descriptions: Vec<_> =
            function.outputs.iter().map(common::expand_parameter_description).collect();

        let shape = types::map_return_shape(&function.outputs, &origin)?;
        let (return_type, return_expression, return_struct) =
            self.expand_return(function, &shape);

        let local_name = util::method_ident(&function.name, "_call");
        let local_doc = format!(
            "Executes `{signature}` as a local read-only call (selector `0x{selector_hex}`)."
        );
        let local = quote! {
            #[doc = #local_doc]
            pub async fn #local_name(
                &self,
                #( #parameters, )*
                #attached_parameter
            ) -> ::std::result::Result<#return_type, ContractError> {
                const INPUTS: &[ParameterDescription] = &[ #( #input_descriptions ),* ];
                const OUTPUTS: &[ParameterDescription] = &[ #( #output_descriptions ),* ];
                let parameters = ::std::vec![ #( #values ),* ];
                let result = self
                    .contract
                    .local_call(Selector(#selector), INPUTS, OUTPUTS, parameters, #attached_value)
                    .await?;
                #return_expression
            }
        };

        if function.constant {
            return Ok((local, return_struct));
        }

        let remote_name = util::method_ident(&function.name, "");
        let remote_doc = format!(
            "Submits `{signature}` as a state-changing transaction (selector `0x{selector_hex}`) \
             and returns the events it emitted, with unknown logs dropped."
        );
        let function_name = &function.name;
        let remote = quote! {
            #[doc = #remote_doc]
            pub async fn #remote_name(
                &self,
                #( #parameters, )*
                #attached_parameter
            ) -> ::std::result::Result<::std::vec::Vec<DecodedEvent<L>>, ContractError> {
                const INPUTS: &[ParameterDescription] = &[ #( #input_descriptions ),* ];
                let parameters = ::std::vec![ #( #values ),* ];
                self.contract
                    .remote_call(Selector(#selector), INPUTS, parameters, #function_name, #attached_value)
                    .await
            }
        };

        Ok((quote!(#remote #local), return_struct))
    }

    /// Synthesizes the local binding's return type, the expression shaping
    /// the decoded values into it, and the return struct when one is needed.
    fn expand_return(
        &self,
        function: &AbiFunction,
        shape: &ReturnShape,
    ) -> (TokenStream, TokenStream, Option<TokenStream>) {
        match shape {
            ReturnShape::Unit => (
                quote!(()),
                quote! {
                    let _ = result;
                    Ok(())
                },
                None,
            ),
            ReturnShape::Single(expression) => (
                expression.expand(),
                quote! {
                    let mut values = result.into_iter();
                    let value = values.next().ok_or(ValueError::Arity)?;
                    Ok(FromValue::from_value(value)?)
                },
                None,
            ),
            ReturnShape::Record(fields) => {
                let struct_name = util::safe_pascal_case_ident(&format!("{}Return", function.name));
                let needs_large =
                    fields.iter().any(|(_, expression)| expression.needs_large_integer());

                let field_idents: Vec<_> = fields
                    .iter()
                    .enumerate()
                    .map(|(index, (name, _))| util::expand_input_name(index, name))
                    .collect();
                let field_types: Vec<_> =
                    fields.iter().map(|(_, expression)| expression.expand()).collect();

                let (generics, impl_header) = if needs_large {
                    (quote!(<L>), quote!(impl<L> #struct_name<L>))
                } else {
                    (quote!(), quote!(impl #struct_name))
                };
                let from_values_generics = if needs_large { quote!() } else { quote!(<L>) };

                let doc = format!(
                    "Record of the return values of the `{}` function, keyed by output name.",
                    function.name,
                );
                let declaration = quote! {
                    #[doc = #doc]
                    #[derive(Debug, Clone, PartialEq)]
                    pub struct #struct_name #generics {
                        #( pub #field_idents: #field_types, )*
                    }

                    #impl_header {
                        fn from_values #from_values_generics (
                            values: ::std::vec::Vec<Value<L>>,
                        ) -> ::std::result::Result<Self, ValueError> {
                            let mut values = values.into_iter();
                            Ok(Self {
                                #( #field_idents: FromValue::from_value(
                                    values.next().ok_or(ValueError::Arity)?,
                                )?, )*
                            })
                        }
                    }
                };

                (
                    quote!(#struct_name #generics),
                    quote!(Ok(#struct_name::from_values(result)?)),
                    Some(declaration),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rawabi::RawAbi;

    fn abi(json: &str) -> RawAbi {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn constant_functions_get_only_the_local_binding() {
        let abi = abi(
            r#"[{"type":"function","name":"get","constant":true,"payable":false,
                "inputs":[],"outputs":[{"name":"value","type":"uint256"}]}]"#,
        );
        let context = Context::new("Store", &abi);
        let (methods, structs) = context.expand_methods().unwrap();
        let methods = methods.to_string();
        assert!(methods.contains("pub async fn get_call"));
        assert!(!methods.contains("pub async fn get ("));
        assert!(structs.is_empty());
    }

    #[test]
    fn state_changing_functions_get_both_bindings() {
        let abi = abi(
            r#"[{"type":"function","name":"transfer","constant":false,"payable":false,
                "inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"}],
                "outputs":[{"name":"","type":"bool"}]}]"#,
        );
        let context = Context::new("Token", &abi);
        let (methods, _) = context.expand_methods().unwrap();
        let methods = methods.to_string();
        assert!(methods.contains("pub async fn transfer ("));
        assert!(methods.contains("pub async fn transfer_call ("));
        // the canonical ERC-20 transfer selector
        assert!(methods.contains("[169 , 5 , 156 , 187]"));
        assert!(!methods.contains("attached_value"));
    }

    #[test]
    fn payable_functions_take_an_attached_value() {
        let abi = abi(
            r#"[{"type":"function","name":"deposit","constant":false,"payable":true,
                "inputs":[],"outputs":[]}]"#,
        );
        let context = Context::new("Vault", &abi);
        let (methods, _) = context.expand_methods().unwrap();
        let methods = methods.to_string();
        assert!(methods.contains("attached_value : :: std :: option :: Option < Uint256 < L > >"));
    }

    #[test]
    fn multi_output_functions_get_a_named_return_struct() {
        let abi = abi(
            r#"[{"type":"function","name":"getReserves","constant":true,"payable":false,
                "inputs":[],"outputs":[
                    {"name":"reserve0","type":"uint112"},
                    {"name":"reserve1","type":"uint112"},
                    {"name":"blockTimestampLast","type":"uint32"}]}]"#,
        );
        let context = Context::new("Pair", &abi);
        let (methods, structs) = context.expand_methods().unwrap();
        let structs = structs.to_string();
        assert!(structs.contains("pub struct GetReservesReturn < L >"));
        assert!(structs.contains("pub reserve_0 : Uint112 < L >"));
        assert!(structs.contains("pub block_timestamp_last : Uint32"));
        assert!(methods.to_string().contains("GetReservesReturn"));
    }

    #[test]
    fn unnamed_multi_outputs_fail_at_generation_time() {
        let abi = abi(
            r#"[{"type":"function","name":"broken","constant":true,"payable":false,
                "inputs":[],"outputs":[{"name":"a","type":"uint256"},{"name":"","type":"bool"}]}]"#,
        );
        let context = Context::new("Broken", &abi);
        match context.expand_methods() {
            Err(Error::AmbiguousReturnShape { origin }) => {
                assert_eq!(origin.contract, "Broken");
                assert_eq!(origin.entity, "broken");
            }
            other => panic!("expected AmbiguousReturnShape, got {other:?}"),
        }
    }

    #[test]
    fn overloads_after_the_first_are_silently_dropped() {
        let abi = abi(
            r#"[{"type":"function","name":"set","constant":false,"payable":false,
                "inputs":[{"name":"value","type":"uint256"}],"outputs":[]},
                {"type":"function","name":"set","constant":false,"payable":false,
                "inputs":[{"name":"value","type":"string"}],"outputs":[]}]"#,
        );
        let context = Context::new("Store", &abi);
        let (methods, _) = context.expand_methods().unwrap();
        let methods = methods.to_string();
        assert_eq!(methods.matches("pub async fn set (").count(), 1);
        assert_eq!(methods.matches("pub async fn set_call (").count(), 1);
        // only the first declaration's input type survives
        assert!(methods.contains("value : Uint256 < L >"));
        assert!(!methods.contains("value : :: std :: string :: String"));
    }

    #[test]
    fn empty_parameter_names_become_positional() {
        let abi = abi(
            r#"[{"type":"function","name":"probe","constant":true,"payable":false,
                "inputs":[{"name":"","type":"bool"},{"name":"","type":"address"}],"outputs":[]}]"#,
        );
        let context = Context::new("Probe", &abi);
        let (methods, _) = context.expand_methods().unwrap();
        let methods = methods.to_string();
        assert!(methods.contains("p0 : bool"));
        assert!(methods.contains("p1 : Address"));
    }
}

//! The per-contract expansion pipeline: one ABI in, one Rust module out.

use crate::error::Result;
use crate::rawabi::{CompilerOutput, RawAbi};
use crate::util;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use std::collections::BTreeMap;

mod common;
mod events;
mod methods;
mod types;

pub(crate) use events::EventRegistryEntry;

/// Shared state for the expansion of a single contract.
pub(crate) struct Context<'a> {
    /// The contract name as it appears in the compiler output.
    name: &'a str,
    /// The binding struct ident, a sanitized `PascalCase` of the name.
    ident: Ident,
    /// The wrapping module ident, a sanitized `snake_case` of the name.
    module: Ident,
    abi: &'a RawAbi,
}

/// One fully expanded contract.
pub(crate) struct ExpandedContract {
    /// The contract module plus its companion return and event structs.
    pub tokens: TokenStream,
    /// The registry entries for the contract's events.
    pub events: Vec<EventRegistryEntry>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(name: &'a str, abi: &'a RawAbi) -> Self {
        Self {
            name,
            ident: util::safe_pascal_case_ident(name),
            module: util::safe_module_name(name),
            abi,
        }
    }

    /// Expands the contract to its binding module.
    ///
    /// The module holds the binding struct wired to the shared [`Contract`]
    /// core, the generated methods, and the return and event structs the
    /// methods refer to.
    ///
    /// [`Contract`]: crate::runtime::Contract
    pub(crate) fn expand(&self) -> Result<ExpandedContract> {
        let Context { name, ident, module, .. } = self;
        let (methods, return_structs) = self.expand_methods()?;
        let (event_structs, events) = self.expand_events()?;

        let doc = format!("Generated bindings for the `{name}` contract.");
        let tokens = quote! {
            #[doc = #doc]
            pub mod #module {
                use super::*;

                pub struct #ident<L, D> {
                    contract: Contract<L, D>,
                }

                impl<L, D> #ident<L, D>
                where
                    L: Send + 'static,
                    D: Dependencies<L>,
                {
                    /// Binds the contract at `address` through the given
                    /// collaborators.
                    pub fn new(dependencies: D, address: Address) -> Self {
                        Self { contract: Contract::new(dependencies, address, EVENT_DESCRIPTIONS) }
                    }

                    /// The bound contract address.
                    pub fn address(&self) -> Address {
                        self.contract.address()
                    }

                    #methods
                }

                #return_structs

                #event_structs
            }
        };
        Ok(ExpandedContract { tokens, events })
    }
}

/// All contracts of one compiler output, expanded.
pub(crate) struct ExpandedOutput {
    /// One module per contract, in source-path then contract-name order.
    pub contracts: Vec<TokenStream>,
    /// The merged event registry entries, in topic-hash order.
    pub registry: Vec<TokenStream>,
}

/// Expands every contract in the compiler output.
///
/// Contracts with an empty ABI (interfaces, pure-library artifacts) produce
/// no module. Event registry entries merge across contracts keyed by topic
/// hash; when two contracts declare the same event the later one in
/// iteration order wins, which is harmless since equal hashes imply equal
/// signatures.
pub(crate) fn expand_compiler_output(output: &CompilerOutput) -> Result<ExpandedOutput> {
    let mut contracts = Vec::new();
    let mut registry: BTreeMap<[u8; 32], TokenStream> = BTreeMap::new();
    for (path, artifacts) in &output.contracts {
        for (name, artifact) in artifacts {
            if artifact.abi.is_empty() {
                tracing::debug!(%path, contract = %name, "skipping contract with empty abi");
                continue;
            }
            let expanded = Context::new(name, &artifact.abi).expand()?;
            contracts.push(expanded.tokens);
            for entry in expanded.events {
                registry.insert(entry.hash, entry.tokens);
            }
        }
    }
    Ok(ExpandedOutput { contracts, registry: registry.into_values().collect() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(json: &str) -> CompilerOutput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn expands_a_module_per_contract() {
        let output = output(
            r#"{"contracts":{"Token.sol":{"Token":{"abi":[
                {"type":"function","name":"name","constant":true,"payable":false,
                 "inputs":[],"outputs":[{"name":"","type":"string"}]}]}}}}"#,
        );
        let expanded = expand_compiler_output(&output).unwrap();
        assert_eq!(expanded.contracts.len(), 1);
        let tokens = expanded.contracts[0].to_string();
        assert!(tokens.contains("pub mod token"));
        assert!(tokens.contains("pub struct Token < L , D >"));
        assert!(tokens.contains("pub async fn name_call"));
    }

    #[test]
    fn skips_contracts_with_empty_abis() {
        let output = output(
            r#"{"contracts":{"IToken.sol":{"IToken":{"abi":[]}}}}"#,
        );
        let expanded = expand_compiler_output(&output).unwrap();
        assert!(expanded.contracts.is_empty());
        assert!(expanded.registry.is_empty());
    }

    #[test]
    fn merges_duplicate_events_across_contracts() {
        let transfer = r#"{"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]}"#;
        let output = output(&format!(
            r#"{{"contracts":{{"Token.sol":{{"TokenA":{{"abi":[{transfer}]}},
                "TokenB":{{"abi":[{transfer}]}}}}}}}}"#,
        ));
        let expanded = expand_compiler_output(&output).unwrap();
        assert_eq!(expanded.contracts.len(), 2);
        assert_eq!(expanded.registry.len(), 1);
    }

    #[test]
    fn sanitizes_awkward_contract_names() {
        let output = output(
            r#"{"contracts":{"Enum.sol":{"Enum":{"abi":[
                {"type":"function","name":"kind","constant":true,"payable":false,
                 "inputs":[],"outputs":[{"name":"","type":"uint8"}]}]}}}}"#,
        );
        let expanded = expand_compiler_output(&output).unwrap();
        let tokens = expanded.contracts[0].to_string();
        assert!(tokens.contains("pub mod enum_"));
        assert!(tokens.contains("pub struct Enum < L , D >"));
    }
}

// Runtime support for generated contract bindings.
//
// This module is emitted verbatim at the top of every generated document, so
// it must stay self-contained: std plus the two declared collaborator crates
// (`async-trait`, `thiserror`) and nothing else. It is also compiled as part
// of the generator crate so its behavior is testable without compiling
// generated output.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use thiserror::Error;

/// Conversion from a dynamic codec [`Value`] into a typed binding value.
pub trait FromValue<L>: Sized {
    /// Converts `value`, failing if the codec produced a different shape
    /// than the parameter description promised.
    fn from_value(value: Value<L>) -> Result<Self, ValueError>;
}

/// Conversion from a typed binding value into a dynamic codec [`Value`].
pub trait IntoValue<L> {
    /// Converts `self` for the external encoder.
    fn into_value(self) -> Value<L>;
}

macro_rules! byte_array_types {
    ($($name:ident => $len:literal),* $(,)?) => {$(
        #[doc = concat!("A fixed-width byte array of ", stringify!($len), " bytes.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            #[doc = "Copies `bytes` into the fixed width, failing on a length mismatch."]
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ValueError> {
                if bytes.len() != $len {
                    return Err(ValueError::Mismatch {
                        expected: stringify!($name),
                        found: format!("{} bytes", bytes.len()),
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl<L> FromValue<L> for $name {
            fn from_value(value: Value<L>) -> Result<Self, ValueError> {
                match value {
                    Value::FixedBytes(bytes) => Self::from_slice(&bytes),
                    other => Err(ValueError::mismatch(stringify!($name), &other)),
                }
            }
        }

        impl<L> IntoValue<L> for $name {
            fn into_value(self) -> Value<L> {
                Value::FixedBytes(self.0.to_vec())
            }
        }
    )*};
}

macro_rules! small_integer_types {
    ($($name:ident($inner:ty) => $variant:ident),* $(,)?) => {$(
        #[doc = concat!(
            "A branded `", stringify!($name),
            "` value, carried in a native integer (the width fits the safe range)."
        )]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub $inner);

        impl<L> FromValue<L> for $name {
            fn from_value(value: Value<L>) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(inner) => Ok(Self(inner)),
                    other => Err(ValueError::mismatch(stringify!($name), &other)),
                }
            }
        }

        impl<L> IntoValue<L> for $name {
            fn into_value(self) -> Value<L> {
                Value::$variant(self.0)
            }
        }
    )*};
}

macro_rules! large_integer_types {
    ($($name:ident => $variant:ident),* $(,)?) => {$(
        #[doc = concat!(
            "A branded `", stringify!($name),
            "` value, carried in the injected large-integer representation `L`."
        )]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name<L>(pub L);

        impl<L> FromValue<L> for $name<L> {
            fn from_value(value: Value<L>) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(inner) => Ok(Self(inner)),
                    other => Err(ValueError::mismatch(stringify!($name), &other)),
                }
            }
        }

        impl<L> IntoValue<L> for $name<L> {
            fn into_value(self) -> Value<L> {
                Value::$variant(self.0)
            }
        }
    )*};
}

byte_array_types! {
    Bytes1 => 1, Bytes2 => 2, Bytes3 => 3, Bytes4 => 4, Bytes5 => 5,
    Bytes6 => 6, Bytes7 => 7, Bytes8 => 8, Bytes9 => 9, Bytes10 => 10,
    Bytes11 => 11, Bytes12 => 12, Bytes13 => 13, Bytes14 => 14, Bytes15 => 15,
    Bytes16 => 16, Bytes17 => 17, Bytes18 => 18, Bytes19 => 19, Bytes20 => 20,
    Bytes21 => 21, Bytes22 => 22, Bytes23 => 23, Bytes24 => 24, Bytes25 => 25,
    Bytes26 => 26, Bytes27 => 27, Bytes28 => 28, Bytes29 => 29, Bytes30 => 30,
    Bytes31 => 31, Bytes32 => 32,
}

/// A 20-byte contract or account address.
///
/// Unlike the `BytesN` family, an address is its own codec shape: it travels
/// as [`Value::Address`], never as fixed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Copies `bytes` into the fixed width, failing on a length mismatch.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValueError> {
        if bytes.len() != 20 {
            return Err(ValueError::Mismatch {
                expected: "Address",
                found: format!("{} bytes", bytes.len()),
            });
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl<L> FromValue<L> for Address {
    fn from_value(value: Value<L>) -> Result<Self, ValueError> {
        match value {
            Value::Address(address) => Ok(address),
            other => Err(ValueError::mismatch("Address", &other)),
        }
    }
}

impl<L> IntoValue<L> for Address {
    fn into_value(self) -> Value<L> {
        Value::Address(self)
    }
}

/// A 4-byte function selector. Baked into generated methods at generation
/// time; never a codec value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selector(pub [u8; 4]);

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

small_integer_types! {
    Int8(i64) => SmallInt, Int16(i64) => SmallInt, Int24(i64) => SmallInt,
    Int32(i64) => SmallInt, Int40(i64) => SmallInt, Int48(i64) => SmallInt,
    Uint8(u64) => SmallUint, Uint16(u64) => SmallUint, Uint24(u64) => SmallUint,
    Uint32(u64) => SmallUint, Uint40(u64) => SmallUint, Uint48(u64) => SmallUint,
}

large_integer_types! {
    Int56 => Int, Int64 => Int, Int72 => Int, Int80 => Int, Int88 => Int,
    Int96 => Int, Int104 => Int, Int112 => Int, Int120 => Int, Int128 => Int,
    Int136 => Int, Int144 => Int, Int152 => Int, Int160 => Int, Int168 => Int,
    Int176 => Int, Int184 => Int, Int192 => Int, Int200 => Int, Int208 => Int,
    Int216 => Int, Int224 => Int, Int232 => Int, Int240 => Int, Int248 => Int,
    Int256 => Int,
    Uint56 => Uint, Uint64 => Uint, Uint72 => Uint, Uint80 => Uint,
    Uint88 => Uint, Uint96 => Uint, Uint104 => Uint, Uint112 => Uint,
    Uint120 => Uint, Uint128 => Uint, Uint136 => Uint, Uint144 => Uint,
    Uint152 => Uint, Uint160 => Uint, Uint168 => Uint, Uint176 => Uint,
    Uint184 => Uint, Uint192 => Uint, Uint200 => Uint, Uint208 => Uint,
    Uint216 => Uint, Uint224 => Uint, Uint232 => Uint, Uint240 => Uint,
    Uint248 => Uint, Uint256 => Uint,
}

/// A variable-length byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub Vec<u8>);

impl std::fmt::Display for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A dynamically-typed ABI value, the currency of the external codec.
///
/// The codec contract mirrors the type mapping of the generator: integer
/// widths of 52 bits or fewer travel in the `Small*` variants, wider ones in
/// the injected large-integer representation `L`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<L> {
    /// A boolean.
    Bool(bool),
    /// A signed integer of width <= 52 bits.
    SmallInt(i64),
    /// An unsigned integer of width <= 52 bits.
    SmallUint(u64),
    /// A signed integer of width > 52 bits.
    Int(L),
    /// An unsigned integer of width > 52 bits.
    Uint(L),
    /// A 20-byte address.
    Address(Address),
    /// A fixed-width byte array (`bytes1` .. `bytes32`).
    FixedBytes(Vec<u8>),
    /// A variable-length byte string.
    Bytes(Vec<u8>),
    /// A text string.
    String(String),
    /// A fixed or dynamic array.
    Array(Vec<Value<L>>),
    /// A tuple.
    Tuple(Vec<Value<L>>),
}

impl<L> Value<L> {
    /// A short name for the value's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::SmallInt(_) => "small int",
            Value::SmallUint(_) => "small uint",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Address(_) => "address",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
        }
    }
}

impl<L> FromValue<L> for bool {
    fn from_value(value: Value<L>) -> Result<Self, ValueError> {
        match value {
            Value::Bool(inner) => Ok(inner),
            other => Err(ValueError::mismatch("bool", &other)),
        }
    }
}

impl<L> IntoValue<L> for bool {
    fn into_value(self) -> Value<L> {
        Value::Bool(self)
    }
}

impl<L> FromValue<L> for String {
    fn from_value(value: Value<L>) -> Result<Self, ValueError> {
        match value {
            Value::String(inner) => Ok(inner),
            other => Err(ValueError::mismatch("string", &other)),
        }
    }
}

impl<L> IntoValue<L> for String {
    fn into_value(self) -> Value<L> {
        Value::String(self)
    }
}

impl<L> FromValue<L> for Bytes {
    fn from_value(value: Value<L>) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(inner) => Ok(Bytes(inner)),
            other => Err(ValueError::mismatch("bytes", &other)),
        }
    }
}

impl<L> IntoValue<L> for Bytes {
    fn into_value(self) -> Value<L> {
        Value::Bytes(self.0)
    }
}

impl<L, T: FromValue<L>> FromValue<L> for Vec<T> {
    fn from_value(value: Value<L>) -> Result<Self, ValueError> {
        match value {
            Value::Array(values) => values.into_iter().map(T::from_value).collect(),
            other => Err(ValueError::mismatch("array", &other)),
        }
    }
}

impl<L, T: IntoValue<L>> IntoValue<L> for Vec<T> {
    fn into_value(self) -> Value<L> {
        Value::Array(self.into_iter().map(T::into_value).collect())
    }
}

macro_rules! tuple_values {
    ($(($($t:ident),+))+) => {$(
        impl<L, $($t: FromValue<L>),+> FromValue<L> for ($($t,)+) {
            fn from_value(value: Value<L>) -> Result<Self, ValueError> {
                match value {
                    Value::Tuple(values) => {
                        let mut values = values.into_iter();
                        Ok(($($t::from_value(values.next().ok_or(ValueError::Arity)?)?,)+))
                    }
                    other => Err(ValueError::mismatch("tuple", &other)),
                }
            }
        }

        impl<L, $($t: IntoValue<L>),+> IntoValue<L> for ($($t,)+) {
            fn into_value(self) -> Value<L> {
                #[allow(non_snake_case)]
                let ($($t,)+) = self;
                Value::Tuple(vec![$($t.into_value()),+])
            }
        }
    )*};
}

tuple_values! {
    (T1)
    (T1, T2)
    (T1, T2, T3)
    (T1, T2, T3, T4)
    (T1, T2, T3, T4, T5)
    (T1, T2, T3, T4, T5, T6)
    (T1, T2, T3, T4, T5, T6, T7)
    (T1, T2, T3, T4, T5, T6, T7, T8)
    (T1, T2, T3, T4, T5, T6, T7, T8, T9)
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10)
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11)
    (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12)
}

/// A parameter description as the external codec consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescription {
    /// The declared parameter name. May be empty.
    pub name: &'static str,
    /// The raw ABI type descriptor.
    pub kind: &'static str,
    /// Tuple components, non-empty iff `kind` starts with `tuple`.
    pub components: &'static [ParameterDescription],
}

/// An event parameter description: a parameter plus its `indexed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventParameterDescription {
    /// The declared parameter name.
    pub name: &'static str,
    /// The raw ABI type descriptor.
    pub kind: &'static str,
    /// Tuple components, non-empty iff `kind` starts with `tuple`.
    pub components: &'static [ParameterDescription],
    /// Whether the value travels in the log's topic list.
    pub indexed: bool,
}

impl EventParameterDescription {
    /// The parameter as the codec sees it, without the event-specific flag.
    pub fn as_parameter(&self) -> ParameterDescription {
        ParameterDescription { name: self.name, kind: self.kind, components: self.components }
    }
}

/// Everything needed to recognize and decode one event definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescription {
    /// The declared event name.
    pub name: &'static str,
    /// The canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub signature: &'static str,
    /// The Keccak-256 hash of the canonical signature: the first log topic.
    pub hash: [u8; 32],
    /// All parameters, in declaration order.
    pub parameters: &'static [EventParameterDescription],
}

/// A transaction as handed to the external call executor or submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction<L> {
    /// The contract address the call is directed at.
    pub to: Address,
    /// Selector-prefixed call data.
    pub data: Vec<u8>,
    /// The attached value, for payable calls.
    pub value: Option<Uint256<L>>,
}

/// The submission collaborator's report for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Whether the transaction succeeded.
    pub success: bool,
    /// The raw logs the transaction emitted.
    pub events: Vec<EncodedEvent>,
}

/// One raw log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// The log topics; the first one, when present, identifies the event.
    pub topics: Vec<Bytes32>,
    /// The log's data payload.
    pub data: Vec<u8>,
}

/// One decoded log record.
///
/// Every named parameter ends up in `parameters` keyed by its declared name,
/// regardless of whether it traveled in the topics or the data payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent<L> {
    /// The declared event name.
    pub name: &'static str,
    /// Decoded parameter values keyed by declared parameter name.
    pub parameters: BTreeMap<&'static str, Value<L>>,
}

/// An error produced by an external collaborator (call executor, submitter).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DependencyError(pub String);

/// An encode/decode failure reported by the external ABI codec.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CodecError {
    /// The codec's own description of the failure.
    pub message: String,
}

/// A shape mismatch between a decoded [`Value`] and the expected typed value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The codec produced a differently-shaped value than the description
    /// promised.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// The expected typed shape.
        expected: &'static str,
        /// What was actually found.
        found: String,
    },
    /// A named parameter was absent from a decoded event.
    #[error("missing decoded parameter `{0}`")]
    Missing(String),
    /// The decoder returned fewer values than the description listed.
    #[error("decoder returned too few values")]
    Arity,
}

impl ValueError {
    /// A mismatch against the given decoded value.
    pub fn mismatch<L>(expected: &'static str, found: &Value<L>) -> Self {
        ValueError::Mismatch { expected, found: found.shape().to_owned() }
    }

    /// A missing named parameter.
    pub fn missing(name: &str) -> Self {
        ValueError::Missing(name.to_owned())
    }
}

/// Errors surfaced by generated bindings at call time.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The call executor reported no result where one was expected.
    #[error("call returned no result, but one was expected")]
    EmptyResult,

    /// The submission collaborator reported a failed transaction. The raw
    /// receipt is retained for diagnosis.
    #[error("remote call of `{function}` failed: {receipt:?}")]
    TransactionFailed {
        /// The bound function's declared name.
        function: &'static str,
        /// The raw receipt as reported.
        receipt: TransactionReceipt,
    },

    /// The external codec failed to encode or decode call parameters.
    #[error(
        "codec failure over {} parameters and {} bytes: {source}",
        descriptions.len(),
        data.len()
    )]
    Codec {
        /// The parameter descriptions the codec was working against.
        descriptions: &'static [ParameterDescription],
        /// The raw bytes involved (empty for encode failures).
        data: Vec<u8>,
        /// The codec's report.
        source: CodecError,
    },

    /// A known event's topics or data failed to decode.
    #[error("failed to decode event `{signature}`: {source}")]
    EventDecode {
        /// The event's canonical signature.
        signature: &'static str,
        /// The codec's report.
        source: CodecError,
    },

    /// A decoded value did not match its expected typed shape.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A collaborator failed outright.
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

/// The external collaborators every generated binding executes through.
///
/// `call` must be side-effect-free from the chain's perspective;
/// `submit_transaction` changes state. Cancellation, timeouts and retries are
/// entirely the implementor's concern: bindings issue exactly one call or
/// submission per invocation and propagate whatever outcome they receive.
#[async_trait]
pub trait Dependencies<L: Send + 'static>: Send + Sync {
    /// Executes a read-only call, returning the raw result bytes, or `None`
    /// if the executor produced no result.
    async fn call(&self, transaction: Transaction<L>) -> Result<Option<Bytes>, DependencyError>;

    /// Submits a state-changing transaction and reports its receipt.
    async fn submit_transaction(
        &self,
        transaction: Transaction<L>,
    ) -> Result<TransactionReceipt, DependencyError>;

    /// Encodes `parameters` against `descriptions`.
    fn encode_parameters(
        &self,
        descriptions: &[ParameterDescription],
        parameters: &[Value<L>],
    ) -> Result<Vec<u8>, CodecError>;

    /// Decodes `data` against `descriptions`.
    fn decode_parameters(
        &self,
        descriptions: &[ParameterDescription],
        data: &[u8],
    ) -> Result<Vec<Value<L>>, CodecError>;
}

/// The base every generated contract binding wraps.
///
/// Generated local methods go through [`Contract::local_call`]; generated
/// remote methods go through [`Contract::remote_call`], which decodes the
/// receipt's logs against the global event registry.
pub struct Contract<L, D> {
    dependencies: D,
    address: Address,
    events: &'static [EventDescription],
    _large_integer: PhantomData<L>,
}

impl<L, D> Contract<L, D>
where
    L: Send + 'static,
    D: Dependencies<L>,
{
    /// Binds `address` through the given collaborators, decoding events
    /// against `events`.
    pub fn new(dependencies: D, address: Address, events: &'static [EventDescription]) -> Self {
        Self { dependencies, address, events, _large_integer: PhantomData }
    }

    /// The bound contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The collaborators this binding executes through.
    pub fn dependencies(&self) -> &D {
        &self.dependencies
    }

    /// Issues a read-only call and decodes the raw result against `outputs`.
    pub async fn local_call(
        &self,
        selector: Selector,
        inputs: &'static [ParameterDescription],
        outputs: &'static [ParameterDescription],
        parameters: Vec<Value<L>>,
        attached_value: Option<Uint256<L>>,
    ) -> Result<Vec<Value<L>>, ContractError> {
        let data = self.encode_method(selector, inputs, &parameters)?;
        let transaction = Transaction { to: self.address, data, value: attached_value };
        let result = match self.dependencies.call(transaction).await? {
            Some(result) => result,
            None => return Err(ContractError::EmptyResult),
        };
        self.dependencies.decode_parameters(outputs, &result.0).map_err(|source| {
            ContractError::Codec { descriptions: outputs, data: result.0, source }
        })
    }

    /// Submits a state-changing transaction and returns the receipt's
    /// decodable events. Logs that match no known event are silently
    /// dropped, since a transaction may emit events from unrelated
    /// contracts.
    pub async fn remote_call(
        &self,
        selector: Selector,
        inputs: &'static [ParameterDescription],
        parameters: Vec<Value<L>>,
        function: &'static str,
        attached_value: Option<Uint256<L>>,
    ) -> Result<Vec<DecodedEvent<L>>, ContractError> {
        let data = self.encode_method(selector, inputs, &parameters)?;
        let transaction = Transaction { to: self.address, data, value: attached_value };
        let receipt = self.dependencies.submit_transaction(transaction).await?;
        if !receipt.success {
            return Err(ContractError::TransactionFailed { function, receipt });
        }
        self.decode_events(receipt.events)
    }

    fn encode_method(
        &self,
        selector: Selector,
        descriptions: &'static [ParameterDescription],
        parameters: &[Value<L>],
    ) -> Result<Vec<u8>, ContractError> {
        let encoded = self
            .dependencies
            .encode_parameters(descriptions, parameters)
            .map_err(|source| ContractError::Codec { descriptions, data: Vec::new(), source })?;
        let mut data = Vec::with_capacity(4 + encoded.len());
        data.extend_from_slice(&selector.0);
        data.extend_from_slice(&encoded);
        Ok(data)
    }

    /// Decodes all decodable events among `encoded`, dropping unknown ones.
    pub fn decode_events(
        &self,
        encoded: Vec<EncodedEvent>,
    ) -> Result<Vec<DecodedEvent<L>>, ContractError> {
        let mut decoded = Vec::new();
        for event in encoded {
            if let Some(event) = self.try_decode_event(event)? {
                decoded.push(event);
            }
        }
        Ok(decoded)
    }

    /// Decodes one log record against the registry; `Ok(None)` means the log
    /// matches no known event and is not an error.
    pub fn try_decode_event(
        &self,
        event: EncodedEvent,
    ) -> Result<Option<DecodedEvent<L>>, ContractError> {
        let topic = match event.topics.first() {
            Some(topic) => topic,
            None => return Ok(None),
        };
        let description = match self.events.iter().find(|d| d.hash == topic.0) {
            Some(description) => description,
            None => return Ok(None),
        };
        let parameters =
            self.decode_event_parameters(description, &event.topics[1..], &event.data)?;
        Ok(Some(DecodedEvent { name: description.name, parameters }))
    }

    fn decode_event_parameters(
        &self,
        description: &EventDescription,
        topics: &[Bytes32],
        data: &[u8],
    ) -> Result<BTreeMap<&'static str, Value<L>>, ContractError> {
        let indexed: Vec<ParameterDescription> = description
            .parameters
            .iter()
            .filter(|parameter| parameter.indexed)
            .map(type_for_event_decoding)
            .collect();
        let non_indexed: Vec<ParameterDescription> = description
            .parameters
            .iter()
            .filter(|parameter| !parameter.indexed)
            .map(EventParameterDescription::as_parameter)
            .collect();

        let mut topic_data = Vec::with_capacity(topics.len() * 32);
        for topic in topics {
            topic_data.extend_from_slice(&topic.0);
        }

        let decode = |descriptions: &[ParameterDescription], bytes: &[u8]| {
            self.dependencies.decode_parameters(descriptions, bytes).map_err(|source| {
                ContractError::EventDecode { signature: description.signature, source }
            })
        };
        let indexed_values = decode(&indexed, &topic_data)?;
        let non_indexed_values = decode(&non_indexed, data)?;

        let mut result = BTreeMap::new();
        for (parameter, value) in indexed.iter().zip(indexed_values) {
            result.insert(parameter.name, value);
        }
        for (parameter, value) in non_indexed.iter().zip(non_indexed_values) {
            result.insert(parameter.name, value);
        }
        Ok(result)
    }
}

/// Applies the indexed-parameter canonicalization rule.
///
/// The log-topic encoding stores only the 32-byte hash of dynamic indexed
/// values (strings, dynamic bytes, tuples, arrays), so those decode as an
/// opaque `bytes32` rather than their declared type. Indexed value types
/// decode as declared.
fn type_for_event_decoding(parameter: &EventParameterDescription) -> ParameterDescription {
    if !parameter.indexed {
        return parameter.as_parameter();
    }
    if parameter.kind != "string"
        && parameter.kind != "bytes"
        && !parameter.kind.starts_with("tuple")
        && !parameter.kind.ends_with("[]")
    {
        return parameter.as_parameter();
    }
    ParameterDescription { name: parameter.name, kind: "bytes32", components: &[] }
}

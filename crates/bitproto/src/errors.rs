//! Error types for schema compilation, value validation and byte buffers.

use thiserror::Error;

/// Errors produced while building types, layouts and processors from a schema.
///
/// All of these are reported before any byte is encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Integer (or enum) width outside `1..=64`.
    #[error("invalid bit width {bits}: must be in 1..=64")]
    InvalidBitWidth { bits: u8 },
    /// Array declared with zero capacity.
    #[error("array capacity must be at least 1")]
    InvalidArrayCapacity,
    /// Two fields of one message share a field number.
    #[error("message {message}: duplicate field number {number}")]
    DuplicateFieldNumber { message: String, number: u16 },
    /// Two fields of one message share a name.
    #[error("message {message}: duplicate field name {name:?}")]
    DuplicateFieldName { message: String, name: String },
    /// Two fields of one enum share a name.
    #[error("enum {enum_name}: duplicate field name {name:?}")]
    DuplicateEnumField { enum_name: String, name: String },
    /// Two fields of one enum share a value.
    #[error("enum {enum_name}: duplicate value {value}")]
    DuplicateEnumValue { enum_name: String, value: u64 },
    /// Enum value does not fit in the enum's unsigned width.
    #[error("enum {enum_name}: value {value} does not fit in {bits} bits")]
    EnumValueOverflow {
        enum_name: String,
        value: u64,
        bits: u8,
    },
    /// Serialized message would exceed [`crate::layout::MAX_MESSAGE_BITS`].
    #[error("message {message} is too large: {bits} bits")]
    MessageTooLarge { message: String, bits: u64 },
    /// A type name has no definition in the schema.
    #[error("unresolved type {0:?}")]
    UnresolvedType(String),
    /// A type refers back to itself through aliases or message fields.
    #[error("cyclic type definition involving {0:?}")]
    CyclicType(String),
    /// Two definitions share a name.
    #[error("duplicate definition {0:?}")]
    DuplicateDefinition(String),
}

/// Value-domain errors. Separate from codec mechanics; the caller decides
/// whether to enforce them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Record names a field the message does not declare.
    #[error("unknown field {0:?}")]
    UnknownField(String),
    /// Value kind does not match the declared field type.
    #[error("field {field}: expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    /// Integer does not fit in the declared width.
    #[error("field {field}: value {value} does not fit in {bits} bits")]
    ValueOutOfRange {
        field: String,
        value: i128,
        bits: u8,
    },
    /// Array value has the wrong number of elements.
    #[error("field {field}: expected {expected} elements, got {actual}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// Decoded value is not declared by a non-extensible enum.
    #[error("field {field}: unknown value {value} for enum {enum_name}")]
    UnknownEnumValue {
        field: String,
        enum_name: String,
        value: u64,
    },
}

/// Errors produced at the encode/decode boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer is shorter than the message's byte length.
    #[error("buffer too short: need {required} bytes, got {actual}")]
    BufferTooShort { required: usize, actual: usize },
    /// Value-domain check failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

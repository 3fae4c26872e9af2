//! # bitproto
//!
//! Bit-level codec for schema-driven binary protocols.
//!
//! Messages are flat sequences of bits: every field occupies exactly its
//! declared width (a `Uint(3)` takes three bits, a `Bool` one), fields are laid
//! out back to back in ascending field-number order, and only the last byte is
//! padded. Bits are numbered LSB-first within each byte.
//!
//! Schemas are compiled once into immutable processor trees. The bit driver
//! walks a processor byte by byte and talks to the message through the
//! [`Accessor`] trait, so generated structs ([`BitMessage`]) and runtime
//! records ([`DynamicMessage`]) share the same codec.
//!
//! ## Example
//!
//! ```
//! use bitproto::{FieldDef, MessageDef, Record, Schema, SchemaDef, TypeRef, Value};
//!
//! let def = SchemaDef {
//!     messages: vec![MessageDef::new(
//!         "Pair",
//!         vec![
//!             FieldDef::new(1, "id", TypeRef::Uint(4)),
//!             FieldDef::new(2, "delta", TypeRef::Int(4)),
//!         ],
//!     )],
//!     ..SchemaDef::default()
//! };
//! let schema = Schema::compile(&def).unwrap();
//! let pair = schema.message("Pair").unwrap();
//!
//! let record = Record::from([
//!     ("id".to_string(), Value::Uint(0x2)),
//!     ("delta".to_string(), Value::Int(-1)),
//! ]);
//! assert_eq!(pair.encode(&record).unwrap(), [0xF2]);
//! ```

pub mod accessor;
pub mod bits;
pub mod config;
pub mod driver;
pub mod errors;
#[cfg(feature = "serde")]
pub mod json;
pub mod layout;
pub mod message;
pub mod processor;
pub mod schema;
pub mod types;
pub mod validate;
pub mod value;

#[cfg(test)]
mod proptest_roundtrip;

pub use accessor::{Accessor, DataIndexer};
pub use config::{CodecConfig, EnumPolicy};
pub use errors::{CodecError, SchemaError, ValidationError};
pub use layout::{FieldLayout, Layout, MAX_MESSAGE_BITS};
pub use message::BitMessage;
pub use processor::{
    ArrayProcessor, EnumProcessor, FieldProcessor, MessageProcessor, Processor, ProcessorBuilder,
};
pub use schema::{
    AliasDef, CompiledMessage, ConstantDef, ConstantValue, EnumDef, EnumFieldDef, FieldDef,
    MessageDef, Schema, SchemaDef, TypeRef,
};
pub use types::{AliasType, ArrayType, EnumField, EnumType, MessageField, MessageType, Type};
pub use value::{DynamicMessage, Record, Value};

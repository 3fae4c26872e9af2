//! The closed set of types a schema can declare.
//!
//! Types are immutable once constructed. Composite definitions are shared
//! through [`Arc`], so a message used by many others is built once and the
//! whole tree can be handed across threads.

use std::{collections::HashSet, sync::Arc};

use crate::{
    errors::SchemaError,
    layout::{self, Layout},
};

/// Widest integer a field can declare.
pub const MAX_INTEGER_BITS: u8 = 64;

/// A schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Single bit.
    Bool,
    /// Signed two's-complement integer of the given width.
    Int(u8),
    /// Unsigned integer of the given width.
    Uint(u8),
    /// Named synonym, transparent to the codec.
    Alias(Arc<AliasType>),
    Enum(Arc<EnumType>),
    /// Fixed-capacity homogeneous sequence.
    Array(Arc<ArrayType>),
    Message(Arc<MessageType>),
}

impl Type {
    /// Signed integer type, `bits` in `1..=64`.
    pub fn int(bits: u8) -> Result<Self, SchemaError> {
        check_bits(bits)?;
        Ok(Type::Int(bits))
    }

    /// Unsigned integer type, `bits` in `1..=64`.
    pub fn uint(bits: u8) -> Result<Self, SchemaError> {
        check_bits(bits)?;
        Ok(Type::Uint(bits))
    }

    /// Number of bits a value of this type occupies.
    ///
    /// Saturates instead of overflowing so oversized arrays are caught by the
    /// layout's size ceiling.
    pub fn bit_width(&self) -> u64 {
        match self {
            Type::Bool => 1,
            Type::Int(bits) | Type::Uint(bits) => *bits as u64,
            Type::Alias(alias) => alias.target.bit_width(),
            Type::Enum(e) => e.bits as u64,
            Type::Array(array) => array.bit_width(),
            Type::Message(message) => message.layout.total_bits() as u64,
        }
    }

    /// The type with all alias layers removed.
    pub fn resolve(&self) -> &Type {
        match self {
            Type::Alias(alias) => alias.target.resolve(),
            other => other,
        }
    }

    /// Name of a named type (alias, enum or message).
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Alias(alias) => Some(&alias.name),
            Type::Enum(e) => Some(&e.name),
            Type::Message(m) => Some(&m.name),
            _ => None,
        }
    }
}

pub(crate) fn check_bits(bits: u8) -> Result<(), SchemaError> {
    if bits == 0 || bits > MAX_INTEGER_BITS {
        return Err(SchemaError::InvalidBitWidth { bits });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasType {
    pub name: String,
    pub target: Type,
}

impl AliasType {
    pub fn new(name: impl Into<String>, target: Type) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// A named value of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField {
    pub name: String,
    pub value: u64,
}

impl EnumField {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Enum backed by an unsigned integer of `bits` bits.
///
/// `extensible` only relaxes validation of unknown values; it never changes
/// the width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub bits: u8,
    pub extensible: bool,
    pub fields: Vec<EnumField>,
}

impl EnumType {
    pub fn new(
        name: impl Into<String>,
        bits: u8,
        extensible: bool,
        fields: Vec<EnumField>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_bits(bits)?;

        let mut names = HashSet::with_capacity(fields.len());
        let mut values = HashSet::with_capacity(fields.len());

        for field in &fields {
            if !crate::bits::fits_unsigned(field.value, bits as u32) {
                return Err(SchemaError::EnumValueOverflow {
                    enum_name: name,
                    value: field.value,
                    bits,
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateEnumField {
                    enum_name: name,
                    name: field.name.clone(),
                });
            }
            if !values.insert(field.value) {
                return Err(SchemaError::DuplicateEnumValue {
                    enum_name: name,
                    value: field.value,
                });
            }
        }

        Ok(Self {
            name,
            bits,
            extensible,
            fields,
        })
    }

    pub fn contains(&self, value: u64) -> bool {
        self.fields.iter().any(|f| f.value == value)
    }

    pub fn field_name(&self, value: u64) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.value == value)
            .map(|f| f.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub element: Type,
    pub capacity: usize,
}

impl ArrayType {
    pub fn new(element: Type, capacity: usize) -> Result<Self, SchemaError> {
        if capacity == 0 {
            return Err(SchemaError::InvalidArrayCapacity);
        }
        Ok(Self { element, capacity })
    }

    pub fn bit_width(&self) -> u64 {
        self.element.bit_width().saturating_mul(self.capacity as u64)
    }

    /// Number of nested array levels, counting this one. Aliases are
    /// looked through.
    pub fn depth(&self) -> usize {
        match self.element.resolve() {
            Type::Array(inner) => 1 + inner.depth(),
            _ => 1,
        }
    }
}

/// A field of a message; `number` is its wire identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub number: u16,
    pub name: String,
    pub ty: Type,
}

impl MessageField {
    pub fn new(number: u16, name: impl Into<String>, ty: Type) -> Self {
        Self {
            number,
            name: name.into(),
            ty,
        }
    }
}

/// Composite type. Fields keep declaration order; the layout is computed
/// once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    pub name: String,
    pub fields: Vec<MessageField>,
    layout: Layout,
}

impl MessageType {
    pub fn new(name: impl Into<String>, fields: Vec<MessageField>) -> Result<Self, SchemaError> {
        let name = name.into();

        let mut names = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName {
                    message: name,
                    name: field.name.clone(),
                });
            }
        }

        let layout = layout::compute_layout(&name, &fields)?;
        tracing::debug!(
            message = %name,
            total_bits = layout.total_bits(),
            nbytes = layout.nbytes(),
            "computed message layout"
        );

        Ok(Self {
            name,
            fields,
            layout,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Fields in ascending field number order.
    pub fn sorted_fields(&self) -> Vec<&MessageField> {
        let mut sorted: Vec<&MessageField> = self.fields.iter().collect();
        sorted.sort_by_key(|f| f.number);
        sorted
    }

    pub fn field(&self, number: u16) -> Option<&MessageField> {
        self.fields.iter().find(|f| f.number == number)
    }
}

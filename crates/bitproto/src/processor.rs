//! Processor trees: immutable descriptors of how a type occupies bits.
//!
//! A processor mirrors a [`Type`] with aliases normalized away, so the codec
//! never unwraps an alias at runtime. Message processors carry the per-field
//! `(number, offset, processor)` placements computed by the layout
//! algorithm; the bit driver consults nothing else.

use std::{collections::HashMap, sync::Arc};

use crate::types::{ArrayType, EnumType, MessageType, Type};

/// Recursive bit-level descriptor of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processor {
    Bool,
    Int(u8),
    Uint(u8),
    Enum(Arc<EnumProcessor>),
    Array(Arc<ArrayProcessor>),
    Message(Arc<MessageProcessor>),
}

impl Processor {
    /// Builds a standalone processor for `ty`.
    pub fn build(ty: &Type) -> Processor {
        ProcessorBuilder::default().build(ty)
    }

    pub fn array(element: Processor, capacity: usize) -> Processor {
        Processor::Array(Arc::new(ArrayProcessor { element, capacity }))
    }

    pub fn bit_width(&self) -> u32 {
        match self {
            Processor::Bool => 1,
            Processor::Int(bits) | Processor::Uint(bits) => *bits as u32,
            Processor::Enum(e) => e.bits as u32,
            Processor::Array(array) => array.bit_width(),
            Processor::Message(message) => message.total_bits,
        }
    }
}

/// Enum processor. Encoding delegates to the underlying unsigned integer; the
/// declared values are kept for optional validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumProcessor {
    pub name: String,
    pub bits: u8,
    pub extensible: bool,
    values: Vec<u64>,
}

impl EnumProcessor {
    pub fn new(name: impl Into<String>, bits: u8, extensible: bool, mut values: Vec<u64>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self {
            name: name.into(),
            bits,
            extensible,
            values,
        }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.values.binary_search(&value).is_ok()
    }
}

impl From<&EnumType> for EnumProcessor {
    fn from(value: &EnumType) -> Self {
        EnumProcessor::new(
            value.name.clone(),
            value.bits,
            value.extensible,
            value.fields.iter().map(|f| f.value).collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayProcessor {
    pub element: Processor,
    pub capacity: usize,
}

impl ArrayProcessor {
    /// Width of all elements, saturating at `u32::MAX` for arrays too large
    /// to place in a message.
    pub fn bit_width(&self) -> u32 {
        let bits = (self.element.bit_width() as u64).saturating_mul(self.capacity as u64);
        u32::try_from(bits).unwrap_or(u32::MAX)
    }

    /// Local bit offset of element `index`.
    pub fn element_offset(&self, index: usize) -> u64 {
        index as u64 * self.element.bit_width() as u64
    }
}

/// Placement of one field inside a message processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProcessor {
    pub number: u16,
    pub name: String,
    pub offset_bits: u32,
    pub processor: Processor,
}

impl FieldProcessor {
    pub fn new(number: u16, name: impl Into<String>, offset_bits: u32, processor: Processor) -> Self {
        Self {
            number,
            name: name.into(),
            offset_bits,
            processor,
        }
    }

    pub fn end_bits(&self) -> u64 {
        self.offset_bits as u64 + self.processor.bit_width() as u64
    }
}

/// Message processor: fields ordered by number with their bit offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageProcessor {
    pub name: String,
    fields: Vec<FieldProcessor>,
    total_bits: u32,
}

impl MessageProcessor {
    /// Creates a message processor from precomputed placements, as emitted by
    /// code generators. Fields are reordered by number.
    pub fn new(name: impl Into<String>, mut fields: Vec<FieldProcessor>) -> Self {
        fields.sort_by_key(|f| f.number);
        debug_assert!(
            fields.windows(2).all(|w| w[0].end_bits() == w[1].offset_bits as u64),
            "field placements must be contiguous"
        );

        let total_bits = fields
            .last()
            .map_or(0, |f| u32::try_from(f.end_bits()).unwrap_or(u32::MAX));
        Self {
            name: name.into(),
            fields,
            total_bits,
        }
    }

    pub fn fields(&self) -> &[FieldProcessor] {
        &self.fields
    }

    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    pub fn nbytes(&self) -> usize {
        crate::bits::nbytes(self.total_bits as u64)
    }

    pub fn field(&self, number: u16) -> Option<&FieldProcessor> {
        self.fields
            .binary_search_by_key(&number, |f| f.number)
            .ok()
            .map(|i| &self.fields[i])
    }

    pub(crate) fn field_index(&self, number: u16) -> Option<usize> {
        self.fields.binary_search_by_key(&number, |f| f.number).ok()
    }

    /// Index of the first field that ends after bit `lo` (relative to the
    /// message start). Fields are contiguous, so their ends are monotonic.
    pub(crate) fn first_ending_after(&self, lo: u64) -> usize {
        self.fields.partition_point(|f| f.end_bits() <= lo)
    }
}

/// Builds processors from types, sharing one processor per message and enum
/// definition.
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    // Keyed by definition address; the definition is held so the address
    // stays valid for the builder's lifetime.
    messages: HashMap<*const MessageType, (Arc<MessageType>, Arc<MessageProcessor>)>,
    enums: HashMap<*const EnumType, (Arc<EnumType>, Arc<EnumProcessor>)>,
}

impl ProcessorBuilder {
    pub fn build(&mut self, ty: &Type) -> Processor {
        match ty {
            Type::Bool => Processor::Bool,
            Type::Int(bits) => Processor::Int(*bits),
            Type::Uint(bits) => Processor::Uint(*bits),
            Type::Alias(alias) => self.build(&alias.target),
            Type::Enum(e) => Processor::Enum(self.enumeration(e)),
            Type::Array(array) => self.array(array),
            Type::Message(message) => Processor::Message(self.message(message)),
        }
    }

    pub fn message(&mut self, message: &Arc<MessageType>) -> Arc<MessageProcessor> {
        let key = Arc::as_ptr(message);
        if let Some((_, processor)) = self.messages.get(&key) {
            return Arc::clone(processor);
        }

        let mut fields = Vec::with_capacity(message.fields.len());
        for entry in message.layout().entries() {
            let Some(field) = message.field(entry.number) else {
                continue;
            };
            let processor = self.build(&field.ty);
            fields.push(FieldProcessor::new(
                entry.number,
                entry.name.clone(),
                entry.offset_bits,
                processor,
            ));
        }

        let processor = Arc::new(MessageProcessor::new(message.name.clone(), fields));
        self.messages
            .insert(key, (Arc::clone(message), Arc::clone(&processor)));
        processor
    }

    fn enumeration(&mut self, e: &Arc<EnumType>) -> Arc<EnumProcessor> {
        let key = Arc::as_ptr(e);
        let (_, processor) = self
            .enums
            .entry(key)
            .or_insert_with(|| (Arc::clone(e), Arc::new(EnumProcessor::from(e.as_ref()))));
        Arc::clone(processor)
    }

    fn array(&mut self, array: &ArrayType) -> Processor {
        let element = self.build(&array.element);
        Processor::array(element, array.capacity)
    }
}

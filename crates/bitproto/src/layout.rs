//! Layout algorithm: assigns every message field a bit offset and width.
//!
//! Fields are placed in ascending field number order, not declaration order.
//! The first field starts at bit 0 and every following field starts where the
//! previous one ends, so a message has neither gaps nor overlaps.

use std::collections::HashSet;

use crate::{bits, errors::SchemaError, types::MessageField};

/// Largest serialized message size, in bits.
pub const MAX_MESSAGE_BITS: u64 = u32::MAX as u64;

/// Placement of one field inside its message's bitstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub number: u16,
    pub name: String,
    pub offset_bits: u32,
    pub width_bits: u32,
}

impl FieldLayout {
    /// First bit past the end of the field.
    pub fn end_bits(&self) -> u64 {
        self.offset_bits as u64 + self.width_bits as u64
    }

    /// Whether any bit of the field falls inside byte `byte_index`.
    pub fn overlaps_byte(&self, byte_index: usize) -> bool {
        let lo = byte_index as u64 * 8;
        (self.offset_bits as u64) < lo + 8 && self.end_bits() > lo
    }
}

/// Field placements of a message, ordered by field number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    entries: Vec<FieldLayout>,
    total_bits: u32,
}

impl Layout {
    pub fn entries(&self) -> &[FieldLayout] {
        &self.entries
    }

    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Serialized size in bytes: `ceil(total_bits / 8)`.
    pub fn nbytes(&self) -> usize {
        bits::nbytes(self.total_bits as u64)
    }

    pub fn get(&self, number: u16) -> Option<&FieldLayout> {
        self.entries
            .binary_search_by_key(&number, |e| e.number)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn offset_of(&self, number: u16) -> Option<u32> {
        self.get(number).map(|e| e.offset_bits)
    }

    /// Fields with at least one bit inside byte `byte_index`.
    pub fn overlapping(&self, byte_index: usize) -> impl Iterator<Item = &FieldLayout> {
        self.entries
            .iter()
            .filter(move |e| e.overlaps_byte(byte_index))
    }
}

/// Computes the layout of `fields` for the message named `message`.
///
/// Fails on duplicate field numbers, or when the total size exceeds
/// [`MAX_MESSAGE_BITS`].
pub fn compute_layout(message: &str, fields: &[MessageField]) -> Result<Layout, SchemaError> {
    let mut sorted: Vec<&MessageField> = fields.iter().collect();
    sorted.sort_by_key(|f| f.number);

    let mut seen = HashSet::with_capacity(sorted.len());
    let mut entries = Vec::with_capacity(sorted.len());
    let mut offset: u64 = 0;

    for field in sorted {
        if !seen.insert(field.number) {
            return Err(SchemaError::DuplicateFieldNumber {
                message: message.to_string(),
                number: field.number,
            });
        }

        let width = field.ty.bit_width();
        let end = offset.saturating_add(width);
        if end > MAX_MESSAGE_BITS {
            return Err(SchemaError::MessageTooLarge {
                message: message.to_string(),
                bits: end,
            });
        }

        entries.push(FieldLayout {
            number: field.number,
            name: field.name.clone(),
            offset_bits: offset as u32,
            width_bits: width as u32,
        });
        offset = end;
    }

    Ok(Layout {
        entries,
        total_bits: offset as u32,
    })
}

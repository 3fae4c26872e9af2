//! The bit driver: moves bits between a message and a flat byte buffer.
//!
//! Encoding walks the output buffer byte by byte. For byte `B` every value
//! whose bit range overlaps `[8B, 8B + 8)` contributes
//! `get_byte(8B - offset) & mask`, and the contributions are OR-ed together.
//! Values never overlap, so the order of contributions does not matter.
//! Decoding is the mirror image with `set_byte`.
//!
//! Arrays and nested messages are descended recursively; only the elements
//! and fields that overlap the current byte are visited.

use std::ops::Range;

use crate::{
    accessor::{Accessor, DataIndexer},
    bits,
    errors::CodecError,
    processor::{ArrayProcessor, MessageProcessor, Processor},
};

/// Encodes `message` into a new buffer of exactly `processor.nbytes()` bytes.
pub fn encode(processor: &MessageProcessor, message: &dyn Accessor) -> Vec<u8> {
    let mut out = vec![0u8; processor.nbytes()];
    encode_bytes(processor, message, &mut out);
    out
}

/// Encodes `message` into the front of `out`, returning the number of bytes
/// written. Padding bits of the last byte are zeroed.
pub fn encode_into(
    processor: &MessageProcessor,
    message: &dyn Accessor,
    out: &mut [u8],
) -> Result<usize, CodecError> {
    let required = processor.nbytes();
    if out.len() < required {
        return Err(CodecError::BufferTooShort {
            required,
            actual: out.len(),
        });
    }

    encode_bytes(processor, message, &mut out[..required]);
    Ok(required)
}

/// Decodes the front of `data` into `message`. Bits are OR-ed into the
/// existing values, so `message` should start zeroed. Trailing bytes are
/// ignored.
pub fn decode_into(
    processor: &MessageProcessor,
    message: &mut dyn Accessor,
    data: &[u8],
) -> Result<(), CodecError> {
    let required = processor.nbytes();
    if data.len() < required {
        return Err(CodecError::BufferTooShort {
            required,
            actual: data.len(),
        });
    }

    tracing::trace!(message = %processor.name, nbytes = required, "decoding");

    let mut di = DataIndexer::new();
    for (index, &input) in data[..required].iter().enumerate() {
        decode_message_byte(processor, 0, index as u64, input, &mut di, message);
    }

    Ok(())
}

fn encode_bytes(processor: &MessageProcessor, message: &dyn Accessor, out: &mut [u8]) {
    tracing::trace!(message = %processor.name, nbytes = out.len(), "encoding");

    let mut di = DataIndexer::new();
    for (index, byte) in out.iter_mut().enumerate() {
        *byte = encode_message_byte(processor, 0, index as u64, &mut di, message);
    }
}

/// Part of a single value that falls inside one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteSpan {
    /// `8B - offset`: how far the value's pattern is shifted right to line
    /// up with the byte. Negative when the value starts inside the byte.
    rshift: i32,
    /// Bits of the byte owned by the value.
    mask: u8,
}

impl ByteSpan {
    fn of(offset: u64, width: u32, byte: u64) -> Option<Self> {
        let lo = byte * 8;
        let start = offset.max(lo);
        let end = (offset + width as u64).min(lo + 8);
        if start >= end {
            return None;
        }

        Some(Self {
            rshift: (lo as i64 - offset as i64) as i32,
            mask: bits::byte_mask((start - lo) as u32, (end - start) as u32),
        })
    }
}

/// Indices of the elements of `array`, placed at `offset`, that overlap
/// byte `byte`.
fn overlapping_elements(array: &ArrayProcessor, offset: u64, byte: u64) -> Range<usize> {
    let width = array.element.bit_width() as u64;
    if width == 0 {
        return 0..0;
    }

    let lo = byte * 8;
    let start = offset.max(lo);
    let end = (offset + width * array.capacity as u64).min(lo + 8);
    if start >= end {
        return 0..0;
    }

    let first = (start - offset) / width;
    let last = (end - 1 - offset) / width;
    first as usize..last as usize + 1
}

fn encode_message_byte(
    processor: &MessageProcessor,
    base: u64,
    byte: u64,
    di: &mut DataIndexer,
    message: &dyn Accessor,
) -> u8 {
    let lo = byte * 8;
    let fields = processor.fields();
    let first = processor.first_ending_after(lo.saturating_sub(base));

    let frame = di.enter_message();
    let mut out = 0u8;
    for field in &fields[first..] {
        let offset = base + field.offset_bits as u64;
        if offset >= lo + 8 {
            break;
        }

        di.set_field(field.number);
        out |= encode_value_byte(&field.processor, offset, byte, di, message);
    }
    di.leave_message(frame);

    out
}

fn encode_value_byte(
    processor: &Processor,
    offset: u64,
    byte: u64,
    di: &mut DataIndexer,
    message: &dyn Accessor,
) -> u8 {
    match processor {
        Processor::Array(array) => {
            let mut out = 0u8;
            for index in overlapping_elements(array, offset, byte) {
                di.push_index(index);
                out |= encode_value_byte(
                    &array.element,
                    offset + array.element_offset(index),
                    byte,
                    di,
                    message,
                );
                di.pop_index();
            }
            out
        }
        Processor::Message(nested) => {
            let child = message.message(di);
            debug_assert!(
                child.is_some(),
                "accessor has no nested message for field {}",
                di.field_number()
            );
            let Some(child) = child else {
                return 0;
            };
            encode_message_byte(nested, offset, byte, di, child)
        }
        Processor::Bool | Processor::Int(_) | Processor::Uint(_) | Processor::Enum(_) => {
            match ByteSpan::of(offset, processor.bit_width(), byte) {
                Some(span) => message.get_byte(di, span.rshift) & span.mask,
                None => 0,
            }
        }
    }
}

fn decode_message_byte(
    processor: &MessageProcessor,
    base: u64,
    byte: u64,
    input: u8,
    di: &mut DataIndexer,
    message: &mut dyn Accessor,
) {
    let lo = byte * 8;
    let fields = processor.fields();
    let first = processor.first_ending_after(lo.saturating_sub(base));

    let frame = di.enter_message();
    for field in &fields[first..] {
        let offset = base + field.offset_bits as u64;
        if offset >= lo + 8 {
            break;
        }

        di.set_field(field.number);
        decode_value_byte(&field.processor, offset, byte, input, di, message);
    }
    di.leave_message(frame);
}

fn decode_value_byte(
    processor: &Processor,
    offset: u64,
    byte: u64,
    input: u8,
    di: &mut DataIndexer,
    message: &mut dyn Accessor,
) {
    match processor {
        Processor::Array(array) => {
            for index in overlapping_elements(array, offset, byte) {
                di.push_index(index);
                decode_value_byte(
                    &array.element,
                    offset + array.element_offset(index),
                    byte,
                    input,
                    di,
                    message,
                );
                di.pop_index();
            }
        }
        Processor::Message(nested) => {
            let field_number = di.field_number();
            let child = message.message_mut(di);
            debug_assert!(
                child.is_some(),
                "accessor has no nested message for field {field_number}"
            );
            let Some(child) = child else {
                return;
            };
            decode_message_byte(nested, offset, byte, input, di, child);
        }
        Processor::Bool | Processor::Int(_) | Processor::Uint(_) | Processor::Enum(_) => {
            let Some(span) = ByteSpan::of(offset, processor.bit_width(), byte) else {
                return;
            };

            let masked = input & span.mask;
            if span.rshift >= 0 {
                message.set_byte(di, span.rshift as u32, masked);
            } else {
                message.set_byte(di, 0, masked >> -span.rshift);
            }
        }
    }
}

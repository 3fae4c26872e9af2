//! Per-field byte accessors and the cursor that addresses them.
//!
//! The bit driver never touches message values directly. It asks the message
//! for one byte of a field's bit pattern at a time through [`Accessor`],
//! identifying the field (and array element) with a [`DataIndexer`].

/// Byte-level access to the fields of a message.
///
/// Implementations are usually generated, one match arm per field. Unknown
/// field numbers must be tolerated: `get_byte` returns 0 and `set_byte` does
/// nothing.
pub trait Accessor {
    /// Returns `(pattern >> rshift) & 0xFF` for the addressed value, where
    /// `pattern` is its unsigned bit pattern (booleans are 0/1, signed
    /// integers their two's complement). A negative `rshift` shifts left.
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8;

    /// ORs `b << lshift` into the addressed value's bit pattern. Booleans are
    /// assigned `b != 0` instead.
    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8);

    /// Nested message addressed by `di`, for message-typed fields.
    fn message(&self, _di: &DataIndexer) -> Option<&dyn Accessor> {
        None
    }

    /// Mutable nested message addressed by `di`, for message-typed fields.
    fn message_mut(&mut self, _di: &DataIndexer) -> Option<&mut dyn Accessor> {
        None
    }
}

/// Cursor identifying the field, and for array fields the element indices,
/// the current bit operation concerns.
///
/// One indexer lives for a single encode or decode call. Entering a nested
/// message opens a frame, so accessors of the nested message only see their
/// own field number and indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataIndexer {
    field_number: u16,
    indices: Vec<usize>,
    base: usize,
}

/// Saved state of the enclosing message while a nested one is processed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    field_number: u16,
    base: usize,
}

impl DataIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexer addressing `field_number` with the given array indices,
    /// outermost first.
    pub fn for_field(field_number: u16, indices: &[usize]) -> Self {
        Self {
            field_number,
            indices: indices.to_vec(),
            base: 0,
        }
    }

    pub fn field_number(&self) -> u16 {
        self.field_number
    }

    /// Array indices within the current message, outermost first.
    pub fn indices(&self) -> &[usize] {
        &self.indices[self.base..]
    }

    /// Index at nesting level `level` (0 is the outermost array).
    ///
    /// Panics if the addressed field has fewer array levels, which means the
    /// accessor does not match the processor it is driven by.
    pub fn index(&self, level: usize) -> usize {
        self.indices()[level]
    }

    pub(crate) fn set_field(&mut self, field_number: u16) {
        self.field_number = field_number;
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.indices.push(index);
    }

    pub(crate) fn pop_index(&mut self) {
        self.indices.pop();
    }

    pub(crate) fn enter_message(&mut self) -> Frame {
        let frame = Frame {
            field_number: self.field_number,
            base: self.base,
        };
        self.base = self.indices.len();
        frame
    }

    pub(crate) fn leave_message(&mut self, frame: Frame) {
        self.indices.truncate(self.base);
        self.field_number = frame.field_number;
        self.base = frame.base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_field() {
        let di = DataIndexer::for_field(4, &[2, 1]);
        assert_eq!(di.field_number(), 4);
        assert_eq!(di.indices(), &[2, 1]);
        assert_eq!(di.index(0), 2);
        assert_eq!(di.index(1), 1);
    }

    #[test]
    fn test_nested_frames() {
        let mut di = DataIndexer::new();
        di.set_field(4);
        di.push_index(2);

        let frame = di.enter_message();
        assert!(di.indices().is_empty());

        di.set_field(1);
        di.push_index(7);
        assert_eq!(di.field_number(), 1);
        assert_eq!(di.indices(), &[7]);
        di.pop_index();

        di.leave_message(frame);
        assert_eq!(di.field_number(), 4);
        assert_eq!(di.indices(), &[2]);
    }

    struct Empty;

    impl Accessor for Empty {
        fn get_byte(&self, _di: &DataIndexer, _rshift: i32) -> u8 {
            0
        }

        fn set_byte(&mut self, _di: &DataIndexer, _lshift: u32, _b: u8) {}
    }

    #[test]
    fn test_default_nested_accessors() {
        let mut empty = Empty;
        let di = DataIndexer::for_field(1, &[]);
        assert!(empty.message(&di).is_none());
        assert!(empty.message_mut(&di).is_none());
    }
}

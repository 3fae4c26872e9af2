//! Value-domain checks run on decoded messages.
//!
//! These sit outside the bit driver: decoding itself never fails on a value,
//! and whether an unknown enum value is an error is a caller decision.

use std::fmt::Write as _;

use crate::{
    accessor::{Accessor, DataIndexer},
    bits,
    config::EnumPolicy,
    errors::ValidationError,
    processor::{MessageProcessor, Processor},
};

/// Reads the full `bits`-wide pattern of the value addressed by `di`.
pub fn read_pattern(message: &dyn Accessor, di: &DataIndexer, bits: u32) -> u64 {
    let mut pattern = 0u64;
    for k in 0..bits::nbytes(bits as u64) {
        pattern |= (message.get_byte(di, 8 * k as i32) as u64) << (8 * k);
    }
    pattern & bits::mask(bits)
}

/// Checks every non-extensible enum value in `message` against its declared
/// values. With [`EnumPolicy::Tolerate`] unknown values are only logged.
pub fn check_enums(
    processor: &MessageProcessor,
    message: &dyn Accessor,
    policy: EnumPolicy,
) -> Result<(), ValidationError> {
    let mut walk = EnumWalk {
        di: DataIndexer::new(),
        path: Vec::new(),
        policy,
    };
    walk.message(processor, message)
}

enum Segment<'p> {
    Field(&'p str),
    Index(usize),
}

struct EnumWalk<'p> {
    di: DataIndexer,
    path: Vec<Segment<'p>>,
    policy: EnumPolicy,
}

impl<'p> EnumWalk<'p> {
    fn message(
        &mut self,
        processor: &'p MessageProcessor,
        message: &dyn Accessor,
    ) -> Result<(), ValidationError> {
        let frame = self.di.enter_message();
        for field in processor.fields() {
            if !has_closed_enum(&field.processor) {
                continue;
            }

            self.di.set_field(field.number);
            self.path.push(Segment::Field(&field.name));
            self.value(&field.processor, message)?;
            self.path.pop();
        }
        self.di.leave_message(frame);
        Ok(())
    }

    fn value(
        &mut self,
        processor: &'p Processor,
        message: &dyn Accessor,
    ) -> Result<(), ValidationError> {
        match processor {
            Processor::Enum(e) if !e.extensible => {
                let value = read_pattern(message, &self.di, e.bits as u32);
                if e.contains(value) {
                    return Ok(());
                }

                let field = self.render_path();
                match self.policy {
                    EnumPolicy::Reject => Err(ValidationError::UnknownEnumValue {
                        field,
                        enum_name: e.name.clone(),
                        value,
                    }),
                    EnumPolicy::Tolerate => {
                        tracing::debug!(field = %field, enum_name = %e.name, value, "tolerating unknown enum value");
                        Ok(())
                    }
                }
            }
            Processor::Array(array) => {
                for index in 0..array.capacity {
                    self.di.push_index(index);
                    self.path.push(Segment::Index(index));
                    self.value(&array.element, message)?;
                    self.path.pop();
                    self.di.pop_index();
                }
                Ok(())
            }
            Processor::Message(nested) => match message.message(&self.di) {
                Some(child) => self.message(nested, child),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn render_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                Segment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
            }
        }
        out
    }
}

/// Whether `processor` contains an enum whose values are checked.
fn has_closed_enum(processor: &Processor) -> bool {
    match processor {
        Processor::Enum(e) => !e.extensible,
        Processor::Array(array) => has_closed_enum(&array.element),
        Processor::Message(message) => message
            .fields()
            .iter()
            .any(|f| has_closed_enum(&f.processor)),
        _ => false,
    }
}

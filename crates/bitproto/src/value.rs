//! Dynamic values for messages known only at runtime.
//!
//! A [`Record`] maps field names to [`Value`]s. [`DynamicMessage`] checks a
//! record against a [`MessageProcessor`] once, stores every field as a raw bit
//! pattern and implements [`Accessor`] over it, so the bit driver handles
//! dynamic and generated messages the same way.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    accessor::{Accessor, DataIndexer},
    bits,
    errors::ValidationError,
    processor::{MessageProcessor, Processor},
};

/// Field values of one message, by field name.
pub type Record = BTreeMap<String, Value>;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Array(Vec<Value>),
    Message(Record),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value as `i64`, accepting unsigned values that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integer value as `u64`, accepting non-negative signed values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Message(record) => Some(record),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Message(value)
    }
}

/// Stored form of one value, shaped like its processor.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Unsigned bit pattern of a bool, integer or enum, masked to its width.
    Leaf(u64),
    Array(Vec<Node>),
    Message(DynamicMessage),
}

impl Node {
    fn zero(processor: &Processor) -> Node {
        match processor {
            Processor::Array(array) => {
                Node::Array(vec![Node::zero(&array.element); array.capacity])
            }
            Processor::Message(message) => Node::Message(DynamicMessage::new(Arc::clone(message))),
            _ => Node::Leaf(0),
        }
    }

    fn from_value(processor: &Processor, value: &Value, path: &str) -> Result<Node, ValidationError> {
        match processor {
            Processor::Bool => match value {
                Value::Bool(b) => Ok(Node::Leaf(*b as u64)),
                _ => Err(mismatch(path, "bool")),
            },
            Processor::Uint(bits) => unsigned(value, *bits, path),
            Processor::Enum(e) => unsigned(value, e.bits, path),
            Processor::Int(bits) => signed(value, *bits, path),
            Processor::Array(array) => {
                let Value::Array(items) = value else {
                    return Err(mismatch(path, "array"));
                };
                if items.len() != array.capacity {
                    return Err(ValidationError::ArrayLength {
                        field: path.to_string(),
                        expected: array.capacity,
                        actual: items.len(),
                    });
                }

                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Node::from_value(&array.element, item, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Node::Array)
            }
            Processor::Message(message) => {
                let Value::Message(record) = value else {
                    return Err(mismatch(path, "message"));
                };
                DynamicMessage::from_record_at(Arc::clone(message), record, path).map(Node::Message)
            }
        }
    }

    fn to_value(&self, processor: &Processor) -> Value {
        match (self, processor) {
            (Node::Leaf(pattern), Processor::Bool) => Value::Bool(*pattern != 0),
            (Node::Leaf(pattern), Processor::Int(bits)) => {
                Value::Int(bits::sign_extend(*pattern, *bits as u32))
            }
            (Node::Leaf(pattern), Processor::Uint(_) | Processor::Enum(_)) => Value::Uint(*pattern),
            (Node::Array(items), Processor::Array(array)) => {
                Value::Array(items.iter().map(|n| n.to_value(&array.element)).collect())
            }
            (Node::Message(message), Processor::Message(_)) => Value::Message(message.to_record()),
            // Nodes are only ever built from the processor they are read with.
            (node, processor) => unreachable!("{node:?} does not match {processor:?}"),
        }
    }
}

fn mismatch(path: &str, expected: &'static str) -> ValidationError {
    ValidationError::TypeMismatch {
        field: path.to_string(),
        expected,
    }
}

fn out_of_range(path: &str, value: i128, bits: u8) -> ValidationError {
    ValidationError::ValueOutOfRange {
        field: path.to_string(),
        value,
        bits,
    }
}

fn unsigned(value: &Value, bits: u8, path: &str) -> Result<Node, ValidationError> {
    let v = match value {
        Value::Uint(v) => *v,
        Value::Int(v) => u64::try_from(*v).map_err(|_| out_of_range(path, *v as i128, bits))?,
        _ => return Err(mismatch(path, "unsigned integer")),
    };

    if !bits::fits_unsigned(v, bits as u32) {
        return Err(out_of_range(path, v as i128, bits));
    }
    Ok(Node::Leaf(v))
}

fn signed(value: &Value, bits: u8, path: &str) -> Result<Node, ValidationError> {
    let v = match value {
        Value::Int(v) => *v,
        Value::Uint(v) => i64::try_from(*v).map_err(|_| out_of_range(path, *v as i128, bits))?,
        _ => return Err(mismatch(path, "signed integer")),
    };

    if !bits::fits_signed(v, bits as u32) {
        return Err(out_of_range(path, v as i128, bits));
    }
    Ok(Node::Leaf(bits::to_pattern(v, bits as u32)))
}

/// A message whose shape is given by a processor at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicMessage {
    processor: Arc<MessageProcessor>,
    // One node per processor field, in the processor's field order.
    nodes: Vec<Node>,
}

impl DynamicMessage {
    /// Zeroed message.
    pub fn new(processor: Arc<MessageProcessor>) -> Self {
        let nodes = processor
            .fields()
            .iter()
            .map(|f| Node::zero(&f.processor))
            .collect();
        Self { processor, nodes }
    }

    /// Builds a message from `record`, checking every value against the
    /// declared field types. Fields missing from the record are zero.
    pub fn from_record(
        processor: Arc<MessageProcessor>,
        record: &Record,
    ) -> Result<Self, ValidationError> {
        Self::from_record_at(processor, record, "")
    }

    fn from_record_at(
        processor: Arc<MessageProcessor>,
        record: &Record,
        path: &str,
    ) -> Result<Self, ValidationError> {
        let mut message = Self::new(processor);
        for (name, value) in record {
            let field_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };

            let Some(index) = message.processor.fields().iter().position(|f| &f.name == name)
            else {
                return Err(ValidationError::UnknownField(field_path));
            };
            let field = &message.processor.fields()[index];
            message.nodes[index] = Node::from_value(&field.processor, value, &field_path)?;
        }
        Ok(message)
    }

    pub fn processor(&self) -> &Arc<MessageProcessor> {
        &self.processor
    }

    /// All fields as a record.
    pub fn to_record(&self) -> Record {
        self.processor
            .fields()
            .iter()
            .zip(&self.nodes)
            .map(|(field, node)| (field.name.clone(), node.to_value(&field.processor)))
            .collect()
    }

    /// Value of the field named `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.processor
            .fields()
            .iter()
            .zip(&self.nodes)
            .find(|(field, _)| field.name == name)
            .map(|(field, node)| node.to_value(&field.processor))
    }

    fn locate(&self, di: &DataIndexer) -> Option<(&Processor, &Node)> {
        let index = self.processor.field_index(di.field_number())?;
        let mut processor = &self.processor.fields()[index].processor;
        let mut node = &self.nodes[index];
        for &i in di.indices() {
            let (Processor::Array(array), Node::Array(items)) = (processor, node) else {
                return None;
            };
            processor = &array.element;
            node = items.get(i)?;
        }
        Some((processor, node))
    }

    fn locate_mut(&mut self, di: &DataIndexer) -> Option<(&Processor, &mut Node)> {
        let index = self.processor.field_index(di.field_number())?;
        let mut processor = &self.processor.fields()[index].processor;
        let mut node = &mut self.nodes[index];
        for &i in di.indices() {
            let (Processor::Array(array), Node::Array(items)) = (processor, node) else {
                return None;
            };
            processor = &array.element;
            node = items.get_mut(i)?;
        }
        Some((processor, node))
    }
}

impl Accessor for DynamicMessage {
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {
        match self.locate(di) {
            Some((_, Node::Leaf(pattern))) => bits::byte_at(*pattern, rshift),
            _ => 0,
        }
    }

    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {
        let Some((processor, Node::Leaf(pattern))) = self.locate_mut(di) else {
            return;
        };

        *pattern = match processor {
            Processor::Bool => (b != 0) as u64,
            _ => bits::or_unsigned(*pattern, lshift, b) & bits::mask(processor.bit_width()),
        };
    }

    fn message(&self, di: &DataIndexer) -> Option<&dyn Accessor> {
        match self.locate(di)? {
            (_, Node::Message(message)) => Some(message as &dyn Accessor),
            _ => None,
        }
    }

    fn message_mut(&mut self, di: &DataIndexer) -> Option<&mut dyn Accessor> {
        match self.locate_mut(di)? {
            (_, Node::Message(message)) => Some(message as &mut dyn Accessor),
            _ => None,
        }
    }
}

//! Schema definitions and their compilation.
//!
//! A [`SchemaDef`] is the declarative form of a schema: aliases, enums,
//! messages and constants, with types referenced by name. [`Schema::compile`]
//! resolves the names, validates every definition, computes message layouts
//! and builds one shared processor per message.
//!
//! ```
//! use bitproto::{FieldDef, MessageDef, Record, Schema, SchemaDef, TypeRef, Value};
//!
//! let def = SchemaDef {
//!     messages: vec![MessageDef::new(
//!         "Reading",
//!         vec![
//!             FieldDef::new(1, "small", TypeRef::Uint(3)),
//!             FieldDef::new(2, "signed", TypeRef::Int(5)),
//!             FieldDef::new(3, "flag", TypeRef::Bool),
//!         ],
//!     )],
//!     ..SchemaDef::default()
//! };
//!
//! let schema = Schema::compile(&def).unwrap();
//! let reading = schema.message("Reading").unwrap();
//! assert_eq!(reading.bytes_length(), 2);
//!
//! let record = Record::from([
//!     ("small".to_string(), Value::Uint(5)),
//!     ("signed".to_string(), Value::Int(-3)),
//!     ("flag".to_string(), Value::Bool(true)),
//! ]);
//! let bytes = reading.encode(&record).unwrap();
//! assert_eq!(bytes, [0xED, 0x01]);
//! assert_eq!(reading.decode(&bytes).unwrap(), record);
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    config::CodecConfig,
    driver,
    errors::{CodecError, SchemaError},
    layout::Layout,
    processor::{MessageProcessor, ProcessorBuilder},
    types::{AliasType, ArrayType, EnumField, EnumType, MessageField, MessageType, Type},
    value::{DynamicMessage, Record},
};

/// Reference to a type from a field, alias or array element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TypeRef {
    Bool,
    Int(u8),
    Uint(u8),
    /// Alias, enum or message declared in the same schema.
    Named(String),
    /// Element type and capacity.
    Array(Box<TypeRef>, usize),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(element: TypeRef, capacity: usize) -> Self {
        TypeRef::Array(Box::new(element), capacity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AliasDef {
    pub name: String,
    pub target: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EnumFieldDef {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EnumDef {
    pub name: String,
    /// Width of the backing unsigned integer.
    pub bits: u8,
    /// Whether decoded values outside `fields` are expected.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extensible: bool,
    pub fields: Vec<EnumFieldDef>,
}

/// One message field; `number` decides its position in the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FieldDef {
    pub number: u16,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: TypeRef,
}

impl FieldDef {
    pub fn new(number: u16, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            number,
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    String(String),
}

/// Named constant. Constants never appear on the wire; generators emit them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConstantDef {
    pub name: String,
    pub value: ConstantValue,
}

/// Top-level schema definition. Each list keeps declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchemaDef {
    /// Schema (protocol) name.
    pub name: String,
    pub constants: Vec<ConstantDef>,
    pub aliases: Vec<AliasDef>,
    pub enums: Vec<EnumDef>,
    pub messages: Vec<MessageDef>,
}

/// A message of a compiled schema, ready to encode and decode records.
#[derive(Debug, Clone)]
pub struct CompiledMessage {
    ty: Arc<MessageType>,
    processor: Arc<MessageProcessor>,
}

impl CompiledMessage {
    pub fn name(&self) -> &str {
        &self.ty.name
    }

    pub fn message_type(&self) -> &Arc<MessageType> {
        &self.ty
    }

    pub fn layout(&self) -> &Layout {
        self.ty.layout()
    }

    pub fn processor(&self) -> &Arc<MessageProcessor> {
        &self.processor
    }

    pub fn bytes_length(&self) -> usize {
        self.processor.nbytes()
    }

    /// Zeroed dynamic message of this type.
    pub fn new_message(&self) -> DynamicMessage {
        DynamicMessage::new(Arc::clone(&self.processor))
    }

    /// Encodes `record` into [`Self::bytes_length`] bytes. Missing fields
    /// encode as zero.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        let message = DynamicMessage::from_record(Arc::clone(&self.processor), record)?;
        Ok(driver::encode(&self.processor, &message))
    }

    /// Decodes a record with the default configuration. Every field is
    /// present in the result.
    pub fn decode(&self, data: &[u8]) -> Result<Record, CodecError> {
        self.decode_with(data, &CodecConfig::default())
    }

    pub fn decode_with(&self, data: &[u8], config: &CodecConfig) -> Result<Record, CodecError> {
        let mut message = self.new_message();
        driver::decode_into(&self.processor, &mut message, data)?;
        config.verify(&self.processor, &message)?;
        Ok(message.to_record())
    }
}

/// A compiled schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    constants: Vec<ConstantDef>,
    aliases: Vec<Arc<AliasType>>,
    enums: Vec<Arc<EnumType>>,
    messages: Vec<CompiledMessage>,
    message_index: HashMap<String, usize>,
}

impl Schema {
    /// Resolves and validates `def`. Fails on the first invalid definition.
    pub fn compile(def: &SchemaDef) -> Result<Self, SchemaError> {
        let mut resolver = Resolver::new(def)?;

        let mut aliases = Vec::with_capacity(def.aliases.len());
        for alias in &def.aliases {
            if let Type::Alias(ty) = resolver.named(&alias.name)? {
                aliases.push(ty);
            }
        }

        let mut enums = Vec::with_capacity(def.enums.len());
        for e in &def.enums {
            if let Type::Enum(ty) = resolver.named(&e.name)? {
                enums.push(ty);
            }
        }

        let mut builder = ProcessorBuilder::default();
        let mut messages = Vec::with_capacity(def.messages.len());
        let mut message_index = HashMap::with_capacity(def.messages.len());
        for m in &def.messages {
            let Type::Message(ty) = resolver.named(&m.name)? else {
                continue;
            };
            let processor = builder.message(&ty);
            message_index.insert(m.name.clone(), messages.len());
            messages.push(CompiledMessage { ty, processor });
        }

        tracing::debug!(
            schema = %def.name,
            aliases = aliases.len(),
            enums = enums.len(),
            messages = messages.len(),
            "compiled schema"
        );

        Ok(Self {
            name: def.name.clone(),
            constants: def.constants.clone(),
            aliases,
            enums,
            messages,
            message_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &[ConstantDef] {
        &self.constants
    }

    pub fn aliases(&self) -> &[Arc<AliasType>] {
        &self.aliases
    }

    pub fn enums(&self) -> &[Arc<EnumType>] {
        &self.enums
    }

    pub fn messages(&self) -> &[CompiledMessage] {
        &self.messages
    }

    pub fn message(&self, name: &str) -> Option<&CompiledMessage> {
        self.message_index.get(name).map(|&i| &self.messages[i])
    }

    pub fn enumeration(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn alias(&self, name: &str) -> Option<&Arc<AliasType>> {
        self.aliases.iter().find(|a| a.name == name)
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        Schema::compile(&value)
    }
}

impl TryFrom<&SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(value: &SchemaDef) -> Result<Self, Self::Error> {
        Schema::compile(value)
    }
}

#[derive(Clone, Copy)]
enum Definition<'d> {
    Alias(&'d AliasDef),
    Enum(&'d EnumDef),
    Message(&'d MessageDef),
}

/// Resolves named types on demand, so definitions may refer to ones declared
/// later. Each name is built once.
struct Resolver<'d> {
    definitions: HashMap<&'d str, Definition<'d>>,
    resolved: HashMap<&'d str, Type>,
    visiting: HashSet<&'d str>,
}

impl<'d> Resolver<'d> {
    fn new(def: &'d SchemaDef) -> Result<Self, SchemaError> {
        let mut definitions = HashMap::new();
        let named = def
            .aliases
            .iter()
            .map(|a| (a.name.as_str(), Definition::Alias(a)))
            .chain(def.enums.iter().map(|e| (e.name.as_str(), Definition::Enum(e))))
            .chain(
                def.messages
                    .iter()
                    .map(|m| (m.name.as_str(), Definition::Message(m))),
            );
        for (name, definition) in named {
            if definitions.insert(name, definition).is_some() {
                return Err(SchemaError::DuplicateDefinition(name.to_string()));
            }
        }

        let mut constants = HashSet::new();
        for constant in &def.constants {
            if definitions.contains_key(constant.name.as_str())
                || !constants.insert(constant.name.as_str())
            {
                return Err(SchemaError::DuplicateDefinition(constant.name.clone()));
            }
        }

        Ok(Self {
            definitions,
            resolved: HashMap::new(),
            visiting: HashSet::new(),
        })
    }

    fn named(&mut self, name: &'d str) -> Result<Type, SchemaError> {
        if let Some(ty) = self.resolved.get(name) {
            return Ok(ty.clone());
        }

        let definition = *self
            .definitions
            .get(name)
            .ok_or_else(|| SchemaError::UnresolvedType(name.to_string()))?;
        if !self.visiting.insert(name) {
            return Err(SchemaError::CyclicType(name.to_string()));
        }

        let ty = match definition {
            Definition::Alias(alias) => {
                let target = self.type_ref(&alias.target)?;
                Type::Alias(Arc::new(AliasType::new(name, target)))
            }
            Definition::Enum(e) => {
                let fields = e
                    .fields
                    .iter()
                    .map(|f| EnumField::new(f.name.clone(), f.value))
                    .collect();
                Type::Enum(Arc::new(EnumType::new(name, e.bits, e.extensible, fields)?))
            }
            Definition::Message(message) => {
                let mut fields = Vec::with_capacity(message.fields.len());
                for field in &message.fields {
                    let ty = self.type_ref(&field.ty)?;
                    fields.push(MessageField::new(field.number, field.name.clone(), ty));
                }
                Type::Message(Arc::new(MessageType::new(name, fields)?))
            }
        };

        self.visiting.remove(name);
        self.resolved.insert(name, ty.clone());
        Ok(ty)
    }

    fn type_ref(&mut self, ty: &'d TypeRef) -> Result<Type, SchemaError> {
        match ty {
            TypeRef::Bool => Ok(Type::Bool),
            TypeRef::Int(bits) => Type::int(*bits),
            TypeRef::Uint(bits) => Type::uint(*bits),
            TypeRef::Named(name) => self.named(name),
            TypeRef::Array(element, capacity) => {
                let element = self.type_ref(element)?;
                Ok(Type::Array(Arc::new(ArrayType::new(element, *capacity)?)))
            }
        }
    }
}

//! # bitproto-codegen
//!
//! Generates Rust source for a compiled [`Schema`].
//!
//! Every message becomes a plain struct with one field per schema field, an
//! [`Accessor`](bitproto::Accessor) implementation with one match arm per
//! field number, and a [`BitMessage`](bitproto::BitMessage) implementation
//! whose processor is built on first use and shared afterwards. Enums become
//! integer type aliases with named constants.
//!
//! ```
//! use bitproto::{FieldDef, MessageDef, Schema, SchemaDef, TypeRef};
//! use bitproto_codegen::RustGenerator;
//!
//! let def = SchemaDef {
//!     messages: vec![MessageDef::new("Ping", vec![FieldDef::new(1, "seq", TypeRef::Uint(12))])],
//!     ..SchemaDef::default()
//! };
//! let schema = Schema::compile(&def).unwrap();
//! let source = RustGenerator::new(&schema).render().unwrap();
//! assert!(source.contains("pub struct Ping {"));
//! assert!(source.contains("pub const BYTES_LENGTH_PING: usize = 2;"));
//! ```

pub mod naming;

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt::{self, Write as _},
};

use bitproto::{ConstantValue, EnumType, MessageType, Schema, Type};

use crate::naming::{field_ident, integer_type, to_snake_case, to_upper_snake_case};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// Two schema items map to the same Rust identifier, e.g. fields
    /// `myField` and `my_field`, or enum values `UNKNOWN` in two enums.
    #[error("{first} and {second} both generate the identifier `{ident}`")]
    DuplicateIdent {
        ident: String,
        first: String,
        second: String,
    },
}

/// Identifiers of one namespace, each with the schema item that produced it.
#[derive(Debug, Default)]
struct Idents(HashMap<String, String>);

impl Idents {
    fn claim(&mut self, ident: String, source: String) -> Result<(), GenerateError> {
        match self.0.entry(ident) {
            Entry::Occupied(entry) => Err(GenerateError::DuplicateIdent {
                ident: entry.key().clone(),
                first: entry.get().clone(),
                second: source,
            }),
            Entry::Vacant(entry) => {
                entry.insert(source);
                Ok(())
            }
        }
    }
}

/// Renders a schema as a Rust module.
#[derive(Debug, Clone)]
pub struct RustGenerator<'s> {
    schema: &'s Schema,
    crate_path: String,
}

impl<'s> RustGenerator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            crate_path: "bitproto".to_string(),
        }
    }

    /// Path the generated code uses to reach the codec crate, `bitproto` by
    /// default. Use `crate` when generating into the codec crate itself.
    pub fn with_crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    /// Renders the schema after checking that no two items generate the
    /// same identifier. `Display` renders without the check.
    pub fn render(&self) -> Result<String, GenerateError> {
        self.check_idents()?;
        tracing::debug!(
            schema = %self.schema.name(),
            messages = self.schema.messages().len(),
            "rendering rust source"
        );
        Ok(self.to_string())
    }

    fn check_idents(&self) -> Result<(), GenerateError> {
        let mut types = Idents::default();
        let mut values = Idents::default();

        for constant in self.schema.constants() {
            values.claim(
                to_upper_snake_case(&constant.name),
                format!("constant `{}`", constant.name),
            )?;
        }
        for alias in self.schema.aliases() {
            types.claim(alias.name.clone(), format!("alias `{}`", alias.name))?;
        }
        for e in self.schema.enums() {
            let source = format!("enum `{}`", e.name);
            let snake = to_snake_case(&e.name);
            types.claim(e.name.clone(), source.clone())?;
            values.claim(format!("{snake}_name"), source.clone())?;
            values.claim(format!("{snake}_processor"), source)?;
            for field in &e.fields {
                values.claim(
                    to_upper_snake_case(&field.name),
                    format!("enum value `{}.{}`", e.name, field.name),
                )?;
            }
        }
        for message in self.schema.messages() {
            let message = message.message_type();
            let source = format!("message `{}`", message.name);
            types.claim(message.name.clone(), source.clone())?;
            values.claim(
                format!("BYTES_LENGTH_{}", to_upper_snake_case(&message.name)),
                source,
            )?;

            let mut fields = Idents::default();
            for field in &message.fields {
                fields.claim(
                    field_ident(&field.name),
                    format!("field `{}.{}`", message.name, field.name),
                )?;
            }
        }
        Ok(())
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// Code generated by bitproto-codegen. DO NOT EDIT.")?;
        if !self.schema.name().is_empty() {
            writeln!(f, "// Schema: {}", self.schema.name())?;
        }
        writeln!(f)?;

        if self.schema.enums().is_empty() && self.schema.messages().is_empty() {
            return Ok(());
        }

        let krate = &self.crate_path;
        writeln!(f, "#[allow(unused_imports)]")?;
        writeln!(f, "use std::sync::{{Arc, LazyLock}};")?;
        writeln!(f)?;
        writeln!(f, "#[allow(unused_imports)]")?;
        writeln!(
            f,
            "use {krate}::{{\n    bits, Accessor, BitMessage, DataIndexer, EnumProcessor, FieldProcessor, MessageProcessor,\n    Processor,\n}};"
        )?;
        writeln!(f)
    }

    fn write_constants(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for constant in self.schema.constants() {
            let name = to_upper_snake_case(&constant.name);
            match &constant.value {
                ConstantValue::Bool(value) => writeln!(f, "pub const {name}: bool = {value};")?,
                ConstantValue::Int(value) => writeln!(f, "pub const {name}: i64 = {value};")?,
                ConstantValue::String(value) => {
                    writeln!(f, "pub const {name}: &str = {value:?};")?
                }
            }
        }
        if !self.schema.constants().is_empty() {
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_aliases(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for alias in self.schema.aliases() {
            writeln!(f, "pub type {} = {};", alias.name, rust_type(&alias.target))?;
        }
        if !self.schema.aliases().is_empty() {
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_enum(&self, f: &mut fmt::Formatter<'_>, e: &EnumType) -> fmt::Result {
        let name = &e.name;
        let snake = to_snake_case(name);

        writeln!(f, "pub type {name} = {};", integer_type(false, e.bits))?;
        writeln!(f)?;
        for field in &e.fields {
            writeln!(
                f,
                "pub const {}: {name} = {};",
                to_upper_snake_case(&field.name),
                field.value
            )?;
        }
        if !e.fields.is_empty() {
            writeln!(f)?;
        }

        writeln!(f, "/// Declared name of a `{name}` value.")?;
        writeln!(f, "pub fn {snake}_name(value: {name}) -> Option<&'static str> {{")?;
        writeln!(f, "    match value {{")?;
        for field in &e.fields {
            let constant = to_upper_snake_case(&field.name);
            writeln!(f, "        {constant} => Some({:?}),", field.name)?;
        }
        writeln!(f, "        _ => None,")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        let values = e
            .fields
            .iter()
            .map(|field| field.value.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "pub fn {snake}_processor() -> Processor {{")?;
        writeln!(
            f,
            "    Processor::Enum(Arc::new(EnumProcessor::new({name:?}, {}, {}, vec![{values}])))",
            e.bits, e.extensible
        )?;
        writeln!(f, "}}")?;
        writeln!(f)
    }

    fn write_message(&self, f: &mut fmt::Formatter<'_>, message: &MessageType) -> fmt::Result {
        let name = &message.name;
        let layout = message.layout();

        writeln!(
            f,
            "pub const BYTES_LENGTH_{}: usize = {};",
            to_upper_snake_case(name),
            layout.nbytes()
        )?;
        writeln!(f)?;

        writeln!(f, "/// `{name}`: {} bits.", layout.total_bits())?;
        writeln!(f, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
        writeln!(f, "pub struct {name} {{")?;
        for field in &message.fields {
            if let Some(entry) = layout.get(field.number) {
                writeln!(
                    f,
                    "    /// Field {}, bits {}..{}.",
                    field.number,
                    entry.offset_bits,
                    entry.end_bits()
                )?;
            }
            writeln!(f, "    pub {}: {},", field_ident(&field.name), rust_type(&field.ty))?;
        }
        writeln!(f, "}}")?;
        writeln!(f)?;

        writeln!(f, "impl Default for {name} {{")?;
        writeln!(f, "    fn default() -> Self {{")?;
        writeln!(f, "        Self {{")?;
        for field in &message.fields {
            writeln!(
                f,
                "            {}: {},",
                field_ident(&field.name),
                zero_expr(&field.ty)
            )?;
        }
        writeln!(f, "        }}")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        self.write_accessor(f, message)?;
        self.write_bit_message(f, message)
    }

    fn write_accessor(&self, f: &mut fmt::Formatter<'_>, message: &MessageType) -> fmt::Result {
        let mut get_arms = Vec::new();
        let mut set_arms = Vec::new();
        let mut message_arms = Vec::new();
        let mut message_mut_arms = Vec::new();

        for field in message.sorted_fields() {
            let number = field.number;
            let (leaf, place) = element_place(&field.ty, format!("self.{}", field_ident(&field.name)));
            match leaf {
                Type::Bool => {
                    get_arms.push(format!("{number} => bits::byte_at({place} as u64, rshift),"));
                    set_arms.push(format!("{number} => {place} = b != 0,"));
                }
                Type::Uint(bits) => {
                    get_arms.push(format!("{number} => bits::byte_at({place} as u64, rshift),"));
                    set_arms.push(format!(
                        "{number} => {place} = bits::or_unsigned({place} as u64, lshift, b) as {},",
                        integer_type(false, *bits)
                    ));
                }
                Type::Enum(e) => {
                    get_arms.push(format!("{number} => bits::byte_at({place} as u64, rshift),"));
                    set_arms.push(format!(
                        "{number} => {place} = bits::or_unsigned({place} as u64, lshift, b) as {},",
                        integer_type(false, e.bits)
                    ));
                }
                Type::Int(bits) => {
                    get_arms.push(format!("{number} => bits::byte_at({place} as u64, rshift),"));
                    set_arms.push(format!(
                        "{number} => {place} = bits::or_signed({place} as i64, {bits}, lshift, b) as {},",
                        integer_type(true, *bits)
                    ));
                }
                Type::Message(_) => {
                    message_arms.push(format!("{number} => Some(&{place} as &dyn Accessor),"));
                    message_mut_arms
                        .push(format!("{number} => Some(&mut {place} as &mut dyn Accessor),"));
                }
                Type::Alias(_) | Type::Array(_) => {}
            }
        }

        let name = &message.name;
        writeln!(f, "#[allow(clippy::unnecessary_cast)]")?;
        writeln!(f, "impl Accessor for {name} {{")?;

        if get_arms.is_empty() {
            writeln!(f, "    fn get_byte(&self, _di: &DataIndexer, _rshift: i32) -> u8 {{")?;
            writeln!(f, "        0")?;
            writeln!(f, "    }}")?;
            writeln!(f)?;
            writeln!(f, "    fn set_byte(&mut self, _di: &DataIndexer, _lshift: u32, _b: u8) {{}}")?;
        } else {
            writeln!(f, "    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {{")?;
            write_match(f, &get_arms, "0")?;
            writeln!(f, "    }}")?;
            writeln!(f)?;
            writeln!(f, "    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {{")?;
            write_match(f, &set_arms, "{}")?;
            writeln!(f, "    }}")?;
        }

        if !message_arms.is_empty() {
            writeln!(f)?;
            writeln!(f, "    fn message(&self, di: &DataIndexer) -> Option<&dyn Accessor> {{")?;
            write_match(f, &message_arms, "None")?;
            writeln!(f, "    }}")?;
            writeln!(f)?;
            writeln!(
                f,
                "    fn message_mut(&mut self, di: &DataIndexer) -> Option<&mut dyn Accessor> {{"
            )?;
            write_match(f, &message_mut_arms, "None")?;
            writeln!(f, "    }}")?;
        }

        writeln!(f, "}}")?;
        writeln!(f)
    }

    fn write_bit_message(&self, f: &mut fmt::Formatter<'_>, message: &MessageType) -> fmt::Result {
        let name = &message.name;
        let layout = message.layout();

        writeln!(f, "impl BitMessage for {name} {{")?;
        writeln!(
            f,
            "    const BYTES_LENGTH: usize = BYTES_LENGTH_{};",
            to_upper_snake_case(name)
        )?;
        writeln!(f)?;
        writeln!(f, "    fn processor() -> &'static Arc<MessageProcessor> {{")?;
        writeln!(
            f,
            "        static PROCESSOR: LazyLock<Arc<MessageProcessor>> = LazyLock::new(|| {{"
        )?;
        writeln!(f, "            Arc::new(MessageProcessor::new(")?;
        writeln!(f, "                {name:?},")?;
        writeln!(f, "                vec![")?;
        for field in message.sorted_fields() {
            let offset = layout.offset_of(field.number).unwrap_or_default();
            writeln!(
                f,
                "                    FieldProcessor::new({}, {:?}, {offset}, {}),",
                field.number,
                field.name,
                processor_expr(&field.ty)
            )?;
        }
        writeln!(f, "                ],")?;
        writeln!(f, "            ))")?;
        writeln!(f, "        }});")?;
        writeln!(f, "        &PROCESSOR")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")?;
        writeln!(f)
    }
}

impl fmt::Display for RustGenerator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_constants(f)?;
        self.write_aliases(f)?;
        for e in self.schema.enums() {
            self.write_enum(f, e)?;
        }
        for message in self.schema.messages() {
            self.write_message(f, message.message_type())?;
        }
        Ok(())
    }
}

fn write_match(f: &mut fmt::Formatter<'_>, arms: &[String], fallback: &str) -> fmt::Result {
    writeln!(f, "        match di.field_number() {{")?;
    for arm in arms {
        writeln!(f, "            {arm}")?;
    }
    writeln!(f, "            _ => {fallback},")?;
    writeln!(f, "        }}")
}

/// Rust type of a field or alias target.
pub fn rust_type(ty: &Type) -> String {
    match ty {
        Type::Bool => "bool".to_string(),
        Type::Int(bits) => integer_type(true, *bits).to_string(),
        Type::Uint(bits) => integer_type(false, *bits).to_string(),
        Type::Alias(alias) => alias.name.clone(),
        Type::Enum(e) => e.name.clone(),
        Type::Array(array) => format!("[{}; {}]", rust_type(&array.element), array.capacity),
        Type::Message(message) => message.name.clone(),
    }
}

/// Expression for the zero value of `ty`.
pub fn zero_expr(ty: &Type) -> String {
    match ty.resolve() {
        Type::Bool => "false".to_string(),
        Type::Array(array) => format!("std::array::from_fn(|_| {})", zero_expr(&array.element)),
        Type::Message(message) => format!("{}::default()", message.name),
        _ => "0".to_string(),
    }
}

/// Expression building the processor of `ty`, aliases looked through.
pub fn processor_expr(ty: &Type) -> String {
    match ty {
        Type::Bool => "Processor::Bool".to_string(),
        Type::Int(bits) => format!("Processor::Int({bits})"),
        Type::Uint(bits) => format!("Processor::Uint({bits})"),
        Type::Alias(alias) => processor_expr(&alias.target),
        Type::Enum(e) => format!("{}_processor()", to_snake_case(&e.name)),
        Type::Array(array) => format!(
            "Processor::array({}, {})",
            processor_expr(&array.element),
            array.capacity
        ),
        Type::Message(message) => {
            format!("Processor::Message(Arc::clone({}::processor()))", message.name)
        }
    }
}

/// Strips array levels from `ty`, indexing `place` with the data indexer
/// once per level. Returns the element type with aliases resolved.
fn element_place(ty: &Type, mut place: String) -> (&Type, String) {
    let mut ty = ty.resolve();
    let mut level = 0;
    while let Type::Array(array) = ty {
        let _ = write!(place, "[di.index({level})]");
        level += 1;
        ty = array.element.resolve();
    }
    (ty, place)
}

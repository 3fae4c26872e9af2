//! # Property-Based Tests for the Bit Codec
//!
//! Random message shapes built from integer and boolean fields of every
//! width, a closed enum, a nested message, and arrays of all of these up to
//! two levels deep, checked against the layout and round-trip guarantees.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use proptest::prelude::*;

use crate::{
    bits,
    config::CodecConfig,
    schema::{
        CompiledMessage, EnumDef, EnumFieldDef, FieldDef, MessageDef, Schema, SchemaDef, TypeRef,
    },
    value::{Record, Value},
};

const LEVEL_BITS: u64 = 3;
const LEVEL_VALUES: u64 = 5;

/// `Inner { a: Uint(3), b: Int(6), c: Bool }`, 10 bits.
const INNER_BITS: u64 = 10;

fn leaf_type() -> impl Strategy<Value = TypeRef> {
    prop_oneof![
        Just(TypeRef::Bool),
        (1u8..=64).prop_map(TypeRef::Int),
        (1u8..=64).prop_map(TypeRef::Uint),
    ]
}

fn field_type() -> impl Strategy<Value = TypeRef> {
    let single = prop_oneof![
        4 => leaf_type(),
        1 => Just(TypeRef::named("Level")),
        1 => Just(TypeRef::named("Inner")),
    ];
    single.prop_recursive(2, 8, 3, |element| {
        (element, 1usize..4).prop_map(|(element, capacity)| TypeRef::array(element, capacity))
    })
}

fn width(ty: &TypeRef) -> u64 {
    match ty {
        TypeRef::Bool => 1,
        TypeRef::Int(bits) | TypeRef::Uint(bits) => *bits as u64,
        TypeRef::Named(name) if name == "Level" => LEVEL_BITS,
        TypeRef::Named(_) => INNER_BITS,
        TypeRef::Array(element, capacity) => width(element) * *capacity as u64,
    }
}

/// Compiles one message whose fields are declared in reverse number order,
/// next to the `Level` enum and `Inner` message its fields may refer to.
fn compile(fields: &[(u16, TypeRef)]) -> CompiledMessage {
    let defs = fields
        .iter()
        .rev()
        .map(|(number, ty)| FieldDef::new(*number, format!("f{number}"), ty.clone()))
        .collect();
    let level = EnumDef {
        name: "Level".to_string(),
        bits: LEVEL_BITS as u8,
        extensible: false,
        fields: (0..LEVEL_VALUES)
            .map(|value| EnumFieldDef {
                name: format!("LEVEL_{value}"),
                value,
            })
            .collect(),
    };
    let inner = MessageDef::new(
        "Inner",
        vec![
            FieldDef::new(1, "a", TypeRef::Uint(3)),
            FieldDef::new(2, "b", TypeRef::Int(6)),
            FieldDef::new(3, "c", TypeRef::Bool),
        ],
    );
    let def = SchemaDef {
        enums: vec![level],
        messages: vec![MessageDef::new("Random", defs), inner],
        ..SchemaDef::default()
    };
    Schema::compile(&def).unwrap().message("Random").unwrap().clone()
}

/// Seed of element `index` of a composite value.
fn child_seed(seed: u64, index: u64) -> u64 {
    seed.rotate_left(17) ^ (index + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// A value of `ty` derived from an arbitrary seed.
fn value_for(ty: &TypeRef, seed: u64) -> Value {
    match ty {
        TypeRef::Bool => Value::Bool(seed & 1 == 1),
        TypeRef::Uint(bits) => Value::Uint(seed & bits::mask(*bits as u32)),
        TypeRef::Int(bits) => Value::Int(bits::sign_extend(seed, *bits as u32)),
        TypeRef::Named(name) if name == "Level" => Value::Uint(seed % LEVEL_VALUES),
        TypeRef::Named(_) => Value::Message(Record::from([
            ("a".to_string(), Value::Uint(seed & 0b111)),
            ("b".to_string(), Value::Int(bits::sign_extend(seed >> 3, 6))),
            ("c".to_string(), Value::Bool((seed >> 9) & 1 == 1)),
        ])),
        TypeRef::Array(element, capacity) => Value::Array(
            (0..*capacity as u64)
                .map(|i| value_for(element, child_seed(seed, i)))
                .collect(),
        ),
    }
}

fn message_shape() -> impl Strategy<Value = Vec<(u16, TypeRef)>> {
    (
        proptest::collection::btree_set(1u16..500, 1..12),
        proptest::collection::vec(field_type(), 12),
    )
        .prop_map(|(numbers, types)| numbers.into_iter().zip(types).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn record_roundtrip(
        fields in message_shape(),
        seeds in proptest::collection::vec(any::<u64>(), 12),
    ) {
        let message = compile(&fields);
        let record: Record = fields
            .iter()
            .zip(&seeds)
            .map(|((number, ty), seed)| (format!("f{number}"), value_for(ty, *seed)))
            .collect();

        let bytes = message.encode(&record).unwrap();
        prop_assert_eq!(bytes.len(), message.bytes_length());
        // Only declared enum values are generated.
        prop_assert_eq!(message.decode_with(&bytes, &CodecConfig::strict()).unwrap(), record);
    }

    #[test]
    fn byte_length_and_offsets(fields in message_shape()) {
        let message = compile(&fields);
        let total: u64 = fields.iter().map(|(_, ty)| width(ty)).sum();

        prop_assert_eq!(message.layout().total_bits() as u64, total);
        prop_assert_eq!(message.bytes_length() as u64, total.div_ceil(8));

        // Fields are sorted by number in the generated shape.
        let mut offset = 0u64;
        for (number, ty) in &fields {
            prop_assert_eq!(message.layout().offset_of(*number), Some(offset as u32));
            offset += width(ty);
        }
    }

    #[test]
    fn arbitrary_bytes_reencode_with_zero_padding(
        fields in message_shape(),
        data in proptest::collection::vec(any::<u8>(), 1024),
    ) {
        let message = compile(&fields);
        let nbytes = message.bytes_length();
        let record = message.decode(&data).unwrap();
        let bytes = message.encode(&record).unwrap();

        let mut expected = data[..nbytes].to_vec();
        let used = message.layout().total_bits() % 8;
        if used != 0 {
            expected[nbytes - 1] &= bits::mask(used) as u8;
        }
        prop_assert_eq!(bytes, expected);
    }

    #[test]
    fn signed_extremes_roundtrip(bits in 1u8..=64, pad in 0u8..8) {
        let mut fields = vec![(2, TypeRef::Int(bits))];
        if pad > 0 {
            fields.insert(0, (1, TypeRef::Uint(pad)));
        }
        let message = compile(&fields);

        let min = bits::sign_extend(1u64 << (bits - 1), bits as u32);
        let max = bits::mask(bits as u32 - 1) as i64;
        for value in [-1, min, max, 0] {
            let record = Record::from([("f2".to_string(), Value::Int(value))]);
            let decoded = message.decode(&message.encode(&record).unwrap()).unwrap();
            prop_assert_eq!(&decoded["f2"], &Value::Int(value));
        }
    }
}

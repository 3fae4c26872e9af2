//! Identifier conventions for generated Rust code.

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super"];

/// `StationReading` → `station_reading`, `HTTPServer` → `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }

        let boundary = match i.checked_sub(1).map(|j| chars[j]) {
            Some(prev) => {
                prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_lowercase()))
            }
            None => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// `maxSpeed` → `MAX_SPEED`.
pub fn to_upper_snake_case(name: &str) -> String {
    to_snake_case(name).to_uppercase()
}

/// Field name as a Rust identifier.
pub fn field_ident(name: &str) -> String {
    let ident = to_snake_case(name);
    if RESERVED.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Smallest Rust integer type holding `bits` bits.
pub fn integer_type(signed: bool, bits: u8) -> &'static str {
    match (signed, bits) {
        (false, 0..=8) => "u8",
        (false, 9..=16) => "u16",
        (false, 17..=32) => "u32",
        (false, _) => "u64",
        (true, 0..=8) => "i8",
        (true, 9..=16) => "i16",
        (true, 17..=32) => "i32",
        (true, _) => "i64",
    }
}

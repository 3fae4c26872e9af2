//! JSON input and output, enabled with the `serde` feature.
//!
//! Schema definitions use serde's default enum representation for type
//! references:
//!
//! ```json
//! { "number": 1, "name": "values", "type": { "Array": [{ "Uint": 4 }, 3] } }
//! ```
//!
//! Records map field names to plain JSON values: booleans, integers, arrays
//! and nested objects.

use crate::{config::CodecConfig, schema::SchemaDef, value::Record};

impl SchemaDef {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CodecConfig {
    /// Reads a configuration; omitted options keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

pub fn record_from_json(json: &str) -> Result<Record, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn record_to_json(record: &Record) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

// Code generated by bitproto-codegen. DO NOT EDIT.
// Schema: drone

#[allow(unused_imports)]
use std::sync::{Arc, LazyLock};

#[allow(unused_imports)]
use bitproto::{
    bits, Accessor, BitMessage, DataIndexer, EnumProcessor, FieldProcessor, MessageProcessor,
    Processor,
};

pub const MAX_SPEED: i64 = 120;
pub const LABEL: &str = "a \"quoted\" label";

pub type Celsius = i8;
pub type Row = [u8; 3];
pub type Sample = Reading;

pub type FlightMode = u8;

pub const FLIGHT_MODE_IDLE: FlightMode = 0;
pub const FLIGHT_MODE_FLY: FlightMode = 2;

/// Declared name of a `FlightMode` value.
pub fn flight_mode_name(value: FlightMode) -> Option<&'static str> {
    match value {
        FLIGHT_MODE_IDLE => Some("FLIGHT_MODE_IDLE"),
        FLIGHT_MODE_FLY => Some("FLIGHT_MODE_FLY"),
        _ => None,
    }
}

pub fn flight_mode_processor() -> Processor {
    Processor::Enum(Arc::new(EnumProcessor::new("FlightMode", 2, false, vec![0, 2])))
}

pub type Channel = u8;

/// Declared name of a `Channel` value.
pub fn channel_name(value: Channel) -> Option<&'static str> {
    match value {
        _ => None,
    }
}

pub fn channel_processor() -> Processor {
    Processor::Enum(Arc::new(EnumProcessor::new("Channel", 3, true, vec![])))
}

pub const BYTES_LENGTH_SCENARIO: usize = 2;

/// `Scenario`: 9 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Field 3, bits 8..9.
    pub flag: bool,
    /// Field 1, bits 0..3.
    pub small: u8,
    /// Field 2, bits 3..8.
    pub signed: i8,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            flag: false,
            small: 0,
            signed: 0,
        }
    }
}

#[allow(clippy::unnecessary_cast)]
impl Accessor for Scenario {
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {
        match di.field_number() {
            1 => bits::byte_at(self.small as u64, rshift),
            2 => bits::byte_at(self.signed as u64, rshift),
            3 => bits::byte_at(self.flag as u64, rshift),
            _ => 0,
        }
    }

    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {
        match di.field_number() {
            1 => self.small = bits::or_unsigned(self.small as u64, lshift, b) as u8,
            2 => self.signed = bits::or_signed(self.signed as i64, 5, lshift, b) as i8,
            3 => self.flag = b != 0,
            _ => {},
        }
    }
}

impl BitMessage for Scenario {
    const BYTES_LENGTH: usize = BYTES_LENGTH_SCENARIO;

    fn processor() -> &'static Arc<MessageProcessor> {
        static PROCESSOR: LazyLock<Arc<MessageProcessor>> = LazyLock::new(|| {
            Arc::new(MessageProcessor::new(
                "Scenario",
                vec![
                    FieldProcessor::new(1, "small", 0, Processor::Uint(3)),
                    FieldProcessor::new(2, "signed", 3, Processor::Int(5)),
                    FieldProcessor::new(3, "flag", 8, Processor::Bool),
                ],
            ))
        });
        &PROCESSOR
    }
}

pub const BYTES_LENGTH_READING: usize = 1;

/// `Reading`: 8 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Field 1, bits 0..7.
    pub temperature: Celsius,
    /// Field 2, bits 7..8.
    pub valid: bool,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            temperature: 0,
            valid: false,
        }
    }
}

#[allow(clippy::unnecessary_cast)]
impl Accessor for Reading {
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {
        match di.field_number() {
            1 => bits::byte_at(self.temperature as u64, rshift),
            2 => bits::byte_at(self.valid as u64, rshift),
            _ => 0,
        }
    }

    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {
        match di.field_number() {
            1 => self.temperature = bits::or_signed(self.temperature as i64, 7, lshift, b) as i8,
            2 => self.valid = b != 0,
            _ => {},
        }
    }
}

impl BitMessage for Reading {
    const BYTES_LENGTH: usize = BYTES_LENGTH_READING;

    fn processor() -> &'static Arc<MessageProcessor> {
        static PROCESSOR: LazyLock<Arc<MessageProcessor>> = LazyLock::new(|| {
            Arc::new(MessageProcessor::new(
                "Reading",
                vec![
                    FieldProcessor::new(1, "temperature", 0, Processor::Int(7)),
                    FieldProcessor::new(2, "valid", 7, Processor::Bool),
                ],
            ))
        });
        &PROCESSOR
    }
}

pub const BYTES_LENGTH_DRONE: usize = 6;

/// `Drone`: 42 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drone {
    /// Field 3, bits 18..30.
    pub grid: [[u8; 2]; 2],
    /// Field 1, bits 0..2.
    pub mode: FlightMode,
    /// Field 2, bits 2..18.
    pub readings: [Reading; 2],
    /// Field 4, bits 30..42.
    pub altitude: u16,
}

impl Default for Drone {
    fn default() -> Self {
        Self {
            grid: std::array::from_fn(|_| std::array::from_fn(|_| 0)),
            mode: 0,
            readings: std::array::from_fn(|_| Reading::default()),
            altitude: 0,
        }
    }
}

#[allow(clippy::unnecessary_cast)]
impl Accessor for Drone {
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {
        match di.field_number() {
            1 => bits::byte_at(self.mode as u64, rshift),
            3 => bits::byte_at(self.grid[di.index(0)][di.index(1)] as u64, rshift),
            4 => bits::byte_at(self.altitude as u64, rshift),
            _ => 0,
        }
    }

    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {
        match di.field_number() {
            1 => self.mode = bits::or_unsigned(self.mode as u64, lshift, b) as u8,
            3 => self.grid[di.index(0)][di.index(1)] = bits::or_unsigned(self.grid[di.index(0)][di.index(1)] as u64, lshift, b) as u8,
            4 => self.altitude = bits::or_unsigned(self.altitude as u64, lshift, b) as u16,
            _ => {},
        }
    }

    fn message(&self, di: &DataIndexer) -> Option<&dyn Accessor> {
        match di.field_number() {
            2 => Some(&self.readings[di.index(0)] as &dyn Accessor),
            _ => None,
        }
    }

    fn message_mut(&mut self, di: &DataIndexer) -> Option<&mut dyn Accessor> {
        match di.field_number() {
            2 => Some(&mut self.readings[di.index(0)] as &mut dyn Accessor),
            _ => None,
        }
    }
}

impl BitMessage for Drone {
    const BYTES_LENGTH: usize = BYTES_LENGTH_DRONE;

    fn processor() -> &'static Arc<MessageProcessor> {
        static PROCESSOR: LazyLock<Arc<MessageProcessor>> = LazyLock::new(|| {
            Arc::new(MessageProcessor::new(
                "Drone",
                vec![
                    FieldProcessor::new(1, "mode", 0, flight_mode_processor()),
                    FieldProcessor::new(2, "readings", 2, Processor::array(Processor::Message(Arc::clone(Reading::processor())), 2)),
                    FieldProcessor::new(3, "grid", 18, Processor::array(Processor::array(Processor::Uint(3), 2), 2)),
                    FieldProcessor::new(4, "altitude", 30, Processor::Uint(12)),
                ],
            ))
        });
        &PROCESSOR
    }
}

pub const BYTES_LENGTH_EXTREMES: usize = 26;

/// `Extremes`: 202 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extremes {
    /// Field 2, bits 64..128.
    pub r#type: u64,
    /// Field 1, bits 0..64.
    pub low: i64,
    /// Field 3, bits 128..158.
    pub rows: [Row; 2],
    /// Field 4, bits 158..166.
    pub sample: Sample,
    /// Field 5, bits 166..169.
    pub channel: Channel,
    /// Field 6, bits 169..202.
    pub self_: i64,
}

impl Default for Extremes {
    fn default() -> Self {
        Self {
            r#type: 0,
            low: 0,
            rows: std::array::from_fn(|_| std::array::from_fn(|_| 0)),
            sample: Reading::default(),
            channel: 0,
            self_: 0,
        }
    }
}

#[allow(clippy::unnecessary_cast)]
impl Accessor for Extremes {
    fn get_byte(&self, di: &DataIndexer, rshift: i32) -> u8 {
        match di.field_number() {
            1 => bits::byte_at(self.low as u64, rshift),
            2 => bits::byte_at(self.r#type as u64, rshift),
            3 => bits::byte_at(self.rows[di.index(0)][di.index(1)] as u64, rshift),
            5 => bits::byte_at(self.channel as u64, rshift),
            6 => bits::byte_at(self.self_ as u64, rshift),
            _ => 0,
        }
    }

    fn set_byte(&mut self, di: &DataIndexer, lshift: u32, b: u8) {
        match di.field_number() {
            1 => self.low = bits::or_signed(self.low as i64, 64, lshift, b) as i64,
            2 => self.r#type = bits::or_unsigned(self.r#type as u64, lshift, b) as u64,
            3 => self.rows[di.index(0)][di.index(1)] = bits::or_unsigned(self.rows[di.index(0)][di.index(1)] as u64, lshift, b) as u8,
            5 => self.channel = bits::or_unsigned(self.channel as u64, lshift, b) as u8,
            6 => self.self_ = bits::or_signed(self.self_ as i64, 33, lshift, b) as i64,
            _ => {},
        }
    }

    fn message(&self, di: &DataIndexer) -> Option<&dyn Accessor> {
        match di.field_number() {
            4 => Some(&self.sample as &dyn Accessor),
            _ => None,
        }
    }

    fn message_mut(&mut self, di: &DataIndexer) -> Option<&mut dyn Accessor> {
        match di.field_number() {
            4 => Some(&mut self.sample as &mut dyn Accessor),
            _ => None,
        }
    }
}

impl BitMessage for Extremes {
    const BYTES_LENGTH: usize = BYTES_LENGTH_EXTREMES;

    fn processor() -> &'static Arc<MessageProcessor> {
        static PROCESSOR: LazyLock<Arc<MessageProcessor>> = LazyLock::new(|| {
            Arc::new(MessageProcessor::new(
                "Extremes",
                vec![
                    FieldProcessor::new(1, "low", 0, Processor::Int(64)),
                    FieldProcessor::new(2, "type", 64, Processor::Uint(64)),
                    FieldProcessor::new(3, "rows", 128, Processor::array(Processor::array(Processor::Uint(5), 3), 2)),
                    FieldProcessor::new(4, "sample", 158, Processor::Message(Arc::clone(Reading::processor()))),
                    FieldProcessor::new(5, "channel", 166, channel_processor()),
                    FieldProcessor::new(6, "self", 169, Processor::Int(33)),
                ],
            ))
        });
        &PROCESSOR
    }
}


//! Statically typed messages.

use std::sync::Arc;

use crate::{
    accessor::Accessor, config::CodecConfig, driver, errors::CodecError,
    processor::MessageProcessor,
};

/// A message type with a fixed processor, usually emitted by the code
/// generator.
///
/// The default methods route through the bit driver. `Default` must produce
/// a zeroed message: decoding ORs bits into it.
pub trait BitMessage: Accessor + Default + Sized {
    /// Serialized size in bytes.
    const BYTES_LENGTH: usize;

    /// Processor describing this message's layout, built once and shared.
    fn processor() -> &'static Arc<MessageProcessor>;

    fn encode(&self) -> Vec<u8> {
        driver::encode(Self::processor(), self)
    }

    /// Encodes into the front of `out`, returning [`Self::BYTES_LENGTH`].
    fn encode_into(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        driver::encode_into(Self::processor(), self, out)
    }

    /// Decodes a message from the front of `data` with the default
    /// configuration.
    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with(data, &CodecConfig::default())
    }

    fn decode_with(data: &[u8], config: &CodecConfig) -> Result<Self, CodecError> {
        let mut message = Self::default();
        driver::decode_into(Self::processor(), &mut message, data)?;
        config.verify(Self::processor(), &message)?;
        Ok(message)
    }
}

//! Codec configuration.

use crate::{
    accessor::Accessor, errors::ValidationError, processor::MessageProcessor, validate,
};

/// What to do when a decoded value of a non-extensible enum is not one of its
/// declared values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EnumPolicy {
    /// Keep the raw value.
    #[default]
    Tolerate,
    /// Fail with [`ValidationError::UnknownEnumValue`].
    Reject,
}

/// Options applied around the bit driver. The wire format itself is not
/// configurable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    pub unknown_enum: EnumPolicy,
}

impl CodecConfig {
    /// Configuration rejecting unknown values of non-extensible enums.
    pub fn strict() -> Self {
        Self {
            unknown_enum: EnumPolicy::Reject,
        }
    }

    pub fn with_unknown_enum(mut self, policy: EnumPolicy) -> Self {
        self.unknown_enum = policy;
        self
    }

    /// Runs the value-domain checks this configuration asks for on a decoded
    /// message.
    pub fn verify(
        &self,
        processor: &MessageProcessor,
        message: &dyn Accessor,
    ) -> Result<(), ValidationError> {
        match self.unknown_enum {
            EnumPolicy::Reject => validate::check_enums(processor, message, EnumPolicy::Reject),
            // Walking the message only pays off when someone reads the log.
            EnumPolicy::Tolerate if tracing::enabled!(tracing::Level::DEBUG) => {
                validate::check_enums(processor, message, EnumPolicy::Tolerate)
            }
            EnumPolicy::Tolerate => Ok(()),
        }
    }
}

//! Value codecs: one stateless translator per supported type.
//!
//! A codec writes exactly one value through a [`ValueWriter`] on encode and
//! reads exactly one value from a [`ValueReader`] on decode. Every codec
//! first checks that the [`FieldValue`] it was handed is the variant it
//! handles and reports a mismatch as a typed error.

mod bool_value;
mod bytes_value;
mod double_value;
mod duration;
mod float_value;
mod int32_value;
mod int64_value;
mod message;
mod primitive;
mod string_value;
mod timestamp;
mod uint32_value;
mod uint64_value;

use std::fmt;

use protobson_bson::{ValueReader, ValueWriter};

use crate::error::Result;
use crate::registry::Registry;
use crate::value::FieldValue;

pub use bool_value::BoolValueCodec;
pub use bytes_value::BytesValueCodec;
pub use double_value::DoubleValueCodec;
pub use duration::{duration_from_nanos, duration_to_nanos, DurationCodec};
pub use float_value::FloatValueCodec;
pub use int32_value::Int32ValueCodec;
pub use int64_value::Int64ValueCodec;
pub use message::MessageCodec;
pub use primitive::PrimitiveCodec;
pub use string_value::StringValueCodec;
pub use timestamp::{timestamp_from_millis, timestamp_to_millis, TimestampCodec};
pub use uint32_value::UInt32ValueCodec;
pub use uint64_value::UInt64ValueCodec;

/// Per-call encode state: the registry used for nested lookups and the
/// struct-tag flags of the field being encoded.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub registry: &'a Registry,
    /// Write 64-bit integers as 32-bit when the value fits.
    pub min_size: bool,
}

impl<'a> EncodeContext<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            min_size: false,
        }
    }

    pub fn with_min_size(self, min_size: bool) -> Self {
        Self { min_size, ..self }
    }
}

/// Per-call decode state.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub registry: &'a Registry,
    /// Allow lossy double-to-integer and double-to-float conversions.
    pub truncate: bool,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            truncate: false,
        }
    }

    pub fn with_truncate(self, truncate: bool) -> Self {
        Self { truncate, ..self }
    }
}

/// Encoder and decoder for one type.
///
/// `decode_value` overwrites `value` in place; the variant it is handed
/// tells the codec which type is expected.
pub trait ValueCodec: fmt::Debug + Send + Sync {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()>;

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use protobson_bson::{BsonValue, BsonValueReader, BsonValueWriter};

    use super::*;
    use crate::registry::default_registry;

    pub fn encode(codec: &dyn ValueCodec, value: &FieldValue) -> Result<BsonValue> {
        let ctx = EncodeContext::new(default_registry());
        let mut vw = BsonValueWriter::new();
        codec.encode_value(&ctx, &mut vw, value)?;
        Ok(vw.into_value()?)
    }

    /// Decodes `source` into a target of the same variant as `target`.
    pub fn decode(
        codec: &dyn ValueCodec,
        source: &BsonValue,
        target: FieldValue,
    ) -> Result<FieldValue> {
        let ctx = DecodeContext::new(default_registry());
        let mut vr = BsonValueReader::new(source);
        let mut value = target;
        codec.decode_value(&ctx, &mut vr, &mut value)?;
        assert!(vr.is_consumed(), "codec left the value unread");
        Ok(value)
    }
}

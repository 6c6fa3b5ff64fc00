use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_f64;
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.DoubleValue`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleValueCodec;

impl DoubleValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for DoubleValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::DoubleValue(val) = value else {
            return Err(CodecError::encoder(
                "DoubleValueCodec.EncodeValue",
                TypeKey::DoubleValue,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_double(*v)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::DoubleValue(slot) = value else {
            return Err(CodecError::decoder(
                "DoubleValueCodec.DecodeValue",
                TypeKey::DoubleValue,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Double => Some(vr.read_double()?),
            BsonType::String => Some(parse_f64(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0.0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::DoubleValue)),
        };
        Ok(())
    }
}

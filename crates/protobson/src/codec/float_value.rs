use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_f32;
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.FloatValue`. Written as a BSON double; decoded
/// doubles are narrowed to `f32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatValueCodec;

impl FloatValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for FloatValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::FloatValue(val) = value else {
            return Err(CodecError::encoder(
                "FloatValueCodec.EncodeValue",
                TypeKey::FloatValue,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_double(f64::from(*v))?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::FloatValue(slot) = value else {
            return Err(CodecError::decoder(
                "FloatValueCodec.DecodeValue",
                TypeKey::FloatValue,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Double => Some(vr.read_double()? as f32),
            BsonType::String => Some(parse_f32(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0.0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::FloatValue)),
        };
        Ok(())
    }
}

use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.Int32Value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Int32ValueCodec;

impl Int32ValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for Int32ValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Int32Value(val) = value else {
            return Err(CodecError::encoder(
                "Int32ValueCodec.EncodeValue",
                TypeKey::Int32Value,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_int32(*v)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::Int32Value(slot) = value else {
            return Err(CodecError::decoder(
                "Int32ValueCodec.DecodeValue",
                TypeKey::Int32Value,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Int32 => Some(vr.read_int32()?),
            BsonType::String => Some(vr.read_string()?.parse::<i32>()?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::Int32Value)),
        };
        Ok(())
    }
}

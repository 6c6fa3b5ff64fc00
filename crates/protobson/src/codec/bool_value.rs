use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_bool;
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.BoolValue`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolValueCodec;

impl BoolValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for BoolValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::BoolValue(val) = value else {
            return Err(CodecError::encoder(
                "BoolValueCodec.EncodeValue",
                TypeKey::BoolValue,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_boolean(*v)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::BoolValue(slot) = value else {
            return Err(CodecError::decoder(
                "BoolValueCodec.DecodeValue",
                TypeKey::BoolValue,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Boolean => Some(vr.read_boolean()?),
            BsonType::String => Some(parse_bool(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(false)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::BoolValue)),
        };
        Ok(())
    }
}

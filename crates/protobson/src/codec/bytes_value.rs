use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.BytesValue`. Decodes binary values and, as raw
/// UTF-8 bytes, strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesValueCodec;

impl BytesValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for BytesValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::BytesValue(val) = value else {
            return Err(CodecError::encoder(
                "BytesValueCodec.EncodeValue",
                TypeKey::BytesValue,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(bytes) => vw.write_binary(bytes)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::BytesValue(slot) = value else {
            return Err(CodecError::decoder(
                "BytesValueCodec.DecodeValue",
                TypeKey::BytesValue,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Binary => Some(vr.read_binary()?.0),
            BsonType::String => Some(vr.read_string()?.into_bytes()),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(Vec::new())
            }
            other => return Err(CodecError::unsupported(other, TypeKey::BytesValue)),
        };
        Ok(())
    }
}

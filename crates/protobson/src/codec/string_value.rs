use protobson_bson::{BsonError, BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.StringValue`. Decodes strings and UTF-8
/// binary values.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringValueCodec;

impl StringValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for StringValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::StringValue(val) = value else {
            return Err(CodecError::encoder(
                "StringValueCodec.EncodeValue",
                TypeKey::StringValue,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(s) => vw.write_string(s)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::StringValue(slot) = value else {
            return Err(CodecError::decoder(
                "StringValueCodec.DecodeValue",
                TypeKey::StringValue,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::String => Some(vr.read_string()?),
            BsonType::Binary => {
                let (data, _) = vr.read_binary()?;
                Some(String::from_utf8(data).map_err(|_| BsonError::InvalidUtf8)?)
            }
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(String::new())
            }
            other => return Err(CodecError::unsupported(other, TypeKey::StringValue)),
        };
        Ok(())
    }
}

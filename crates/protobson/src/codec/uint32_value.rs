use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_u32;
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.UInt32Value`.
///
/// The value travels as a BSON int32 holding the same bit pattern, so values
/// above `i32::MAX` appear negative in the document and read back unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct UInt32ValueCodec;

impl UInt32ValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for UInt32ValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::UInt32Value(val) = value else {
            return Err(CodecError::encoder(
                "UInt32ValueCodec.EncodeValue",
                TypeKey::UInt32Value,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_int32(*v as i32)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::UInt32Value(slot) = value else {
            return Err(CodecError::decoder(
                "UInt32ValueCodec.DecodeValue",
                TypeKey::UInt32Value,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Int32 => Some(vr.read_int32()? as u32),
            BsonType::String => Some(parse_u32(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::UInt32Value)),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use protobson_bson::BsonValue;

    use super::*;
    use crate::codec::testing::{decode, encode};

    #[test]
    fn large_values_keep_their_bits() {
        let codec = UInt32ValueCodec::new();
        let encoded = encode(&codec, &FieldValue::UInt32Value(Some(u32::MAX))).unwrap();
        assert_eq!(encoded, BsonValue::Int32(-1));
        assert_eq!(
            decode(&codec, &encoded, FieldValue::UInt32Value(None)),
            Ok(FieldValue::UInt32Value(Some(u32::MAX)))
        );
    }

    #[test]
    fn decode_matrix() {
        let codec = UInt32ValueCodec::new();
        let cases = [
            (BsonValue::Int32(5), Some(5u32)),
            (BsonValue::String("4294967295".into()), Some(u32::MAX)),
            (BsonValue::Null, None),
            (BsonValue::Undefined, Some(0)),
        ];
        for (source, want) in cases {
            assert_eq!(
                decode(&codec, &source, FieldValue::UInt32Value(None)),
                Ok(FieldValue::UInt32Value(want)),
                "{source:?}"
            );
        }
        for text in ["-1", "+1", "4294967296"] {
            assert!(
                matches!(
                    decode(&codec, &BsonValue::String(text.into()), FieldValue::UInt32Value(None)),
                    Err(CodecError::ParseNumber(_))
                ),
                "{text}"
            );
        }
    }
}

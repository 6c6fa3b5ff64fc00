use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_u64;
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.UInt64Value`.
///
/// BSON has no unsigned 64-bit type: the value is written as an int64 with
/// the same bit pattern and reinterpreted on the way back.
#[derive(Debug, Default, Clone, Copy)]
pub struct UInt64ValueCodec;

impl UInt64ValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for UInt64ValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::UInt64Value(val) = value else {
            return Err(CodecError::encoder(
                "UInt64ValueCodec.EncodeValue",
                TypeKey::UInt64Value,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_int64(*v as i64)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::UInt64Value(slot) = value else {
            return Err(CodecError::decoder(
                "UInt64ValueCodec.DecodeValue",
                TypeKey::UInt64Value,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Int64 => Some(vr.read_int64()? as u64),
            BsonType::Int32 => Some(vr.read_int32()? as u64),
            BsonType::String => Some(parse_u64(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::UInt64Value)),
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
    fn encode_reinterprets_bits() {
        let codec = UInt64ValueCodec::new();
        assert_eq!(
            encode(&codec, &FieldValue::UInt64Value(Some(u64::MAX))),
            Ok(BsonValue::Int64(-1))
        );
        assert_eq!(
            encode(&codec, &FieldValue::UInt64Value(None)),
            Ok(BsonValue::Null)
        );
    }

    #[test]
    fn decode_matrix() {
        let codec = UInt64ValueCodec::new();
        let cases = [
            (BsonValue::Int64(-1), Some(u64::MAX)),
            (BsonValue::Int32(9), Some(9u64)),
            (BsonValue::String("42".into()), Some(42)),
            (BsonValue::Null, None),
            (BsonValue::Undefined, Some(0)),
        ];
        for (source, want) in cases {
            assert_eq!(
                decode(&codec, &source, FieldValue::UInt64Value(None)),
                Ok(FieldValue::UInt64Value(want)),
                "{source:?}"
            );
        }
    }

    #[test]
    fn decode_rejects_non_numeric_strings() {
        let codec = UInt64ValueCodec::new();
        for text in ["forty-two", "+42"] {
            assert!(
                matches!(
                    decode(&codec, &BsonValue::String(text.into()), FieldValue::UInt64Value(None)),
                    Err(CodecError::ParseNumber(_))
                ),
                "{text}"
            );
        }
    }
}

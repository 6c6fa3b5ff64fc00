use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Codec for `google.protobuf.Int64Value`. Decodes 64-bit and 32-bit integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Int64ValueCodec;

impl Int64ValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for Int64ValueCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Int64Value(val) = value else {
            return Err(CodecError::encoder(
                "Int64ValueCodec.EncodeValue",
                TypeKey::Int64Value,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(v) => vw.write_int64(*v)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::Int64Value(slot) = value else {
            return Err(CodecError::decoder(
                "Int64ValueCodec.DecodeValue",
                TypeKey::Int64Value,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Int64 => Some(vr.read_int64()?),
            BsonType::Int32 => Some(i64::from(vr.read_int32()?)),
            BsonType::String => Some(vr.read_string()?.parse::<i64>()?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(0)
            }
            other => return Err(CodecError::unsupported(other, TypeKey::Int64Value)),
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
    fn encode_matrix() {
        let codec = Int64ValueCodec::new();
        assert_eq!(
            encode(&codec, &FieldValue::Int64Value(Some(i64::MAX))),
            Ok(BsonValue::Int64(i64::MAX))
        );
        assert_eq!(
            encode(&codec, &FieldValue::Int64Value(None)),
            Ok(BsonValue::Null)
        );
    }

    #[test]
    fn decode_matrix() {
        let codec = Int64ValueCodec::new();
        let cases = [
            (BsonValue::Int64(1 << 40), Some(1i64 << 40)),
            (BsonValue::Int32(-3), Some(-3)),
            (BsonValue::String("9223372036854775807".into()), Some(i64::MAX)),
            (BsonValue::Null, None),
            (BsonValue::Undefined, Some(0)),
        ];
        for (source, want) in cases {
            assert_eq!(
                decode(&codec, &source, FieldValue::Int64Value(None)),
                Ok(FieldValue::Int64Value(want)),
                "{source:?}"
            );
        }
    }
}

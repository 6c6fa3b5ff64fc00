use prost_types::Duration;
use protobson_bson::{BsonType, ValueReader, ValueWriter};
use tracing::warn;

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::text::parse_duration;
use crate::value::{FieldValue, TypeKey};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Total nanoseconds of `d`, saturating at the `i64` bounds.
pub fn duration_to_nanos(d: &Duration) -> i64 {
    let total = i128::from(d.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(d.nanos);
    match i64::try_from(total) {
        Ok(nanos) => nanos,
        Err(_) => {
            warn!(seconds = d.seconds, nanos = d.nanos, "duration saturated");
            if total.is_negative() {
                i64::MIN
            } else {
                i64::MAX
            }
        }
    }
}

/// Splits a nanosecond count; both parts carry the sign of `nanos`.
pub fn duration_from_nanos(nanos: i64) -> Duration {
    Duration {
        seconds: nanos / NANOS_PER_SECOND,
        nanos: (nanos % NANOS_PER_SECOND) as i32,
    }
}

/// Codec for `google.protobuf.Duration`: an int64 of nanoseconds on the
/// wire, or a duration string such as `"1h2m3.5s"` on decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct DurationCodec;

impl DurationCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for DurationCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Duration(val) = value else {
            return Err(CodecError::encoder(
                "DurationCodec.EncodeValue",
                TypeKey::Duration,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(d) => vw.write_int64(duration_to_nanos(d))?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::Duration(slot) = value else {
            return Err(CodecError::decoder(
                "DurationCodec.DecodeValue",
                TypeKey::Duration,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::Int64 => Some(duration_from_nanos(vr.read_int64()?)),
            BsonType::String => Some(duration_from_nanos(parse_duration(&vr.read_string()?)?)),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(Duration::default())
            }
            other => return Err(CodecError::unsupported(other, TypeKey::Duration)),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use protobson_bson::BsonValue;

    use super::*;
    use crate::codec::testing::{decode, encode};
    use crate::text::format_duration;

    fn dur(seconds: i64, nanos: i32) -> Duration {
        Duration { seconds, nanos }
    }

    #[test]
    fn nanos_conversion() {
        assert_eq!(duration_to_nanos(&dur(3723, 500)), 3_723_000_000_500);
        assert_eq!(duration_from_nanos(-1_500_000_000), dur(-1, -500_000_000));
        assert_eq!(duration_to_nanos(&dur(i64::MAX, 0)), i64::MAX);
        assert_eq!(duration_to_nanos(&dur(i64::MIN, 0)), i64::MIN);
    }

    #[test]
    fn encode_matrix() {
        let codec = DurationCodec::new();
        assert_eq!(
            encode(&codec, &FieldValue::Duration(Some(dur(2, 5)))),
            Ok(BsonValue::Int64(2_000_000_005))
        );
        assert_eq!(
            encode(&codec, &FieldValue::Duration(None)),
            Ok(BsonValue::Null)
        );
    }

    #[test]
    fn decode_matrix() {
        let codec = DurationCodec::new();
        let cases = [
            (BsonValue::Int64(1_000_000_001), Some(dur(1, 1))),
            (BsonValue::String("1h2m3s".into()), Some(dur(3723, 0))),
            (BsonValue::String("-1.5ms".into()), Some(dur(0, -1_500_000))),
            (BsonValue::Null, None),
            (BsonValue::Undefined, Some(dur(0, 0))),
        ];
        for (source, want) in cases {
            assert_eq!(
                decode(&codec, &source, FieldValue::Duration(None)),
                Ok(FieldValue::Duration(want)),
                "{source:?}"
            );
        }
        assert!(matches!(
            decode(&codec, &BsonValue::String("1x".into()), FieldValue::Duration(None)),
            Err(CodecError::ParseDuration(_))
        ));
        assert!(matches!(
            decode(&codec, &BsonValue::Int32(1), FieldValue::Duration(None)),
            Err(CodecError::UnsupportedSourceType { .. })
        ));
    }

    proptest! {
        #[test]
        fn integer_and_text_forms_agree(n in any::<i64>()) {
            let codec = DurationCodec::new();
            let from_int = decode(&codec, &BsonValue::Int64(n), FieldValue::Duration(None));
            let from_text = decode(
                &codec,
                &BsonValue::String(format_duration(n)),
                FieldValue::Duration(None),
            );
            prop_assert_eq!(from_int, from_text);
        }

        #[test]
        fn round_trips_through_nanos(n in any::<i64>()) {
            prop_assert_eq!(duration_to_nanos(&duration_from_nanos(n)), n);
        }
    }
}

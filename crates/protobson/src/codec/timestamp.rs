use chrono::DateTime;
use prost_types::Timestamp;
use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::options::{TimestampCodecOptions, TimestampFormat};
use crate::value::{FieldValue, TypeKey};

const NANOS_PER_MILLI: i32 = 1_000_000;

/// Milliseconds since the Unix epoch, truncating sub-millisecond precision.
pub fn timestamp_to_millis(ts: &Timestamp) -> i64 {
    ts.seconds
        .saturating_mul(1000)
        .saturating_add(i64::from(ts.nanos / NANOS_PER_MILLI))
}

pub fn timestamp_from_millis(millis: i64) -> Timestamp {
    Timestamp {
        seconds: millis.div_euclid(1000),
        nanos: millis.rem_euclid(1000) as i32 * NANOS_PER_MILLI,
    }
}

fn parse_rfc3339(s: &str) -> Result<Timestamp> {
    let t = DateTime::parse_from_rfc3339(s)?;
    Ok(Timestamp {
        seconds: t.timestamp(),
        nanos: t.timestamp_subsec_nanos() as i32,
    })
}

/// Codec for `google.protobuf.Timestamp`.
///
/// With [`TimestampFormat::DateTime`] (the default) values are written as a
/// BSON UTC datetime and lose sub-millisecond precision. With
/// [`TimestampFormat::Timestamp`] they are written as a BSON timestamp whose
/// time is the seconds field and whose increment is the nanos field.
///
/// Decoding accepts either wire form regardless of the configured format,
/// as well as RFC 3339 strings. A bare int64 is always epoch milliseconds;
/// an int32 is accepted as seconds under the timestamp format only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampCodec {
    format: TimestampFormat,
}

impl TimestampCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opts: &TimestampCodecOptions) -> Self {
        Self {
            format: opts.format.unwrap_or_default(),
        }
    }

    pub fn format(&self) -> TimestampFormat {
        self.format
    }

    fn write(&self, vw: &mut dyn ValueWriter, ts: &Timestamp) -> Result<()> {
        match self.format {
            TimestampFormat::DateTime => vw.write_datetime(timestamp_to_millis(ts))?,
            TimestampFormat::Timestamp => {
                let time = u32::try_from(ts.seconds).map_err(|_| {
                    CodecError::InvalidTimestamp(format!(
                        "seconds {} do not fit a BSON timestamp",
                        ts.seconds
                    ))
                })?;
                let increment = u32::try_from(ts.nanos).map_err(|_| {
                    CodecError::InvalidTimestamp(format!("negative nanos {}", ts.nanos))
                })?;
                vw.write_timestamp(time, increment)?;
            }
        }
        Ok(())
    }
}

impl ValueCodec for TimestampCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Timestamp(val) = value else {
            return Err(CodecError::encoder(
                "TimestampCodec.EncodeValue",
                TypeKey::Timestamp,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(ts) => self.write(vw, ts)?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::Timestamp(slot) = value else {
            return Err(CodecError::decoder(
                "TimestampCodec.DecodeValue",
                TypeKey::Timestamp,
                value,
            ));
        };
        let seconds_only = self.format == TimestampFormat::Timestamp;
        *slot = match vr.bson_type() {
            BsonType::DateTime => Some(timestamp_from_millis(vr.read_datetime()?)),
            BsonType::Timestamp => {
                let ts = vr.read_timestamp()?;
                if ts.increment >= 1_000_000_000 {
                    return Err(CodecError::InvalidTimestamp(format!(
                        "increment {} is not a nanosecond count",
                        ts.increment
                    )));
                }
                Some(Timestamp {
                    seconds: i64::from(ts.time),
                    nanos: ts.increment as i32,
                })
            }
            BsonType::Int64 => Some(timestamp_from_millis(vr.read_int64()?)),
            BsonType::Int32 if seconds_only => Some(Timestamp {
                seconds: i64::from(vr.read_int32()?),
                nanos: 0,
            }),
            BsonType::String => Some(parse_rfc3339(&vr.read_string()?)?),
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(Timestamp::default())
            }
            other => return Err(CodecError::unsupported(other, TypeKey::Timestamp)),
        };
        Ok(())
    }
}

//! `google.type.DateTime`: civil time with an optional UTC offset or IANA
//! time zone.

use chrono::{
    DateTime as ChronoDateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime,
    NaiveTime, TimeZone as ChronoTimeZone, Timelike,
};
use prost_types::Duration;
use protobson_bson::{BsonType, ValueReader, ValueWriter};

use crate::codec::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Civil date and time. Without a [`TimeOffset`] the value is in local time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
    pub nanos: i32,
    pub time_offset: Option<TimeOffset>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimeOffset {
    /// Whole seconds east of UTC.
    UtcOffset(Duration),
    TimeZone(TimeZone),
}

/// An IANA time zone, e.g. `"America/New_York"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeZone {
    pub id: String,
    pub version: String,
}

fn field(value: i32, name: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| CodecError::InvalidDateTime(format!("negative {name} {value}")))
}

fn naive(dt: &DateTime) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(dt.year, field(dt.month, "month")?, field(dt.day, "day")?)
        .ok_or_else(|| {
            CodecError::InvalidDateTime(format!("{}-{}-{} is not a date", dt.year, dt.month, dt.day))
        })?;
    let time = NaiveTime::from_hms_nano_opt(
        field(dt.hours, "hours")?,
        field(dt.minutes, "minutes")?,
        field(dt.seconds, "seconds")?,
        field(dt.nanos, "nanos")?,
    )
    .ok_or_else(|| {
        CodecError::InvalidDateTime(format!(
            "{}:{}:{}.{} is not a time of day",
            dt.hours, dt.minutes, dt.seconds, dt.nanos
        ))
    })?;
    Ok(date.and_time(time))
}

fn resolve<Tz: ChronoTimeZone>(tz: &Tz, local: &NaiveDateTime) -> Result<ChronoDateTime<FixedOffset>> {
    // Ambiguous local times resolve to the earlier instant.
    tz.from_local_datetime(local)
        .earliest()
        .map(|t| t.fixed_offset())
        .ok_or_else(|| CodecError::InvalidDateTime(format!("{local} does not exist in the time zone")))
}

/// Resolves `dt` to an instant, keeping the offset in effect at that instant.
pub fn date_time_to_chrono(dt: &DateTime) -> Result<ChronoDateTime<FixedOffset>> {
    let local = naive(dt)?;
    match &dt.time_offset {
        Some(TimeOffset::UtcOffset(offset)) => {
            let fixed = i32::try_from(offset.seconds)
                .ok()
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    CodecError::InvalidDateTime(format!("utc offset of {}s", offset.seconds))
                })?;
            resolve(&fixed, &local)
        }
        Some(TimeOffset::TimeZone(zone)) => {
            let tz: chrono_tz::Tz = zone.id.parse().map_err(|err| CodecError::UnknownTimeZone {
                id: zone.id.clone(),
                reason: format!("{err}"),
            })?;
            resolve(&tz, &local)
        }
        None => resolve(&Local, &local),
    }
}

/// Splits an instant into civil fields with a fixed UTC offset.
pub fn chrono_to_date_time(t: &ChronoDateTime<FixedOffset>) -> DateTime {
    DateTime {
        year: t.year(),
        month: t.month() as i32,
        day: t.day() as i32,
        hours: t.hour() as i32,
        minutes: t.minute() as i32,
        seconds: t.second() as i32,
        nanos: t.nanosecond() as i32,
        time_offset: Some(TimeOffset::UtcOffset(Duration {
            seconds: i64::from(t.offset().local_minus_utc()),
            nanos: 0,
        })),
    }
}

fn from_millis(millis: i64) -> Result<DateTime> {
    let t = ChronoDateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CodecError::InvalidDateTime(format!("{millis}ms is out of range")))?;
    Ok(chrono_to_date_time(&t.fixed_offset()))
}

/// Codec for `google.type.DateTime`, written as a BSON UTC datetime.
///
/// Decoded values always carry a fixed UTC offset: a time zone name does not
/// survive a round trip, only the offset it resolved to.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeCodec;

impl DateTimeCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for DateTimeCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::DateTime(val) = value else {
            return Err(CodecError::encoder(
                "DateTimeCodec.EncodeValue",
                TypeKey::DateTime,
                value,
            ));
        };
        match val {
            None => vw.write_null()?,
            Some(dt) => vw.write_datetime(date_time_to_chrono(dt)?.timestamp_millis())?,
        }
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::DateTime(slot) = value else {
            return Err(CodecError::decoder(
                "DateTimeCodec.DecodeValue",
                TypeKey::DateTime,
                value,
            ));
        };
        *slot = match vr.bson_type() {
            BsonType::DateTime => Some(from_millis(vr.read_datetime()?)?),
            BsonType::Int64 => Some(from_millis(vr.read_int64()?)?),
            BsonType::String => {
                let t = ChronoDateTime::parse_from_rfc3339(&vr.read_string()?)?;
                Some(chrono_to_date_time(&t))
            }
            BsonType::Null => {
                vr.read_null()?;
                None
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                Some(DateTime::default())
            }
            other => return Err(CodecError::unsupported(other, TypeKey::DateTime)),
        };
        Ok(())
    }
}

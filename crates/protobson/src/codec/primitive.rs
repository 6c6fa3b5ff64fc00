//! Codec for plain (non-wrapper) scalar fields.

use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::value::{FieldValue, TypeKey};

/// Handles `bool`, the integer kinds, `float`, `double`, `string` and
/// `bytes` fields.
///
/// Integers decode from any BSON number or a boolean. A double decodes into
/// an integer only when it has no fractional part, unless the field is
/// tagged `truncate`. Null and undefined decode to the zero value.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveCodec;

impl PrimitiveCodec {
    pub fn new() -> Self {
        Self
    }
}

fn overflow(value: impl ToString, target: &'static str) -> CodecError {
    CodecError::Overflow {
        value: value.to_string(),
        target,
    }
}

fn write_unsigned(ctx: &EncodeContext<'_>, vw: &mut dyn ValueWriter, v: u64) -> Result<()> {
    if ctx.min_size && v <= i32::MAX as u64 {
        vw.write_int32(v as i32)?;
        return Ok(());
    }
    let v = i64::try_from(v).map_err(|_| overflow(v, "int64"))?;
    vw.write_int64(v)?;
    Ok(())
}

fn read_integer(ctx: &DecodeContext<'_>, vr: &mut dyn ValueReader, target: TypeKey) -> Result<i64> {
    Ok(match vr.bson_type() {
        BsonType::Int32 => i64::from(vr.read_int32()?),
        BsonType::Int64 => vr.read_int64()?,
        BsonType::Double => {
            let f = vr.read_double()?;
            if !ctx.truncate && f.floor() != f {
                return Err(CodecError::Truncation {
                    value: f,
                    target: target.name(),
                });
            }
            // i64 spans [-2^63, 2^63); NaN fails both comparisons.
            if !(-9.223372036854775808e18..9.223372036854775808e18).contains(&f) {
                return Err(overflow(f, "int64"));
            }
            f as i64
        }
        BsonType::Boolean => i64::from(vr.read_boolean()?),
        BsonType::Null => {
            vr.read_null()?;
            0
        }
        BsonType::Undefined => {
            vr.read_undefined()?;
            0
        }
        other => return Err(CodecError::unsupported(other, target)),
    })
}

fn read_float(vr: &mut dyn ValueReader, target: TypeKey) -> Result<f64> {
    Ok(match vr.bson_type() {
        BsonType::Double => vr.read_double()?,
        BsonType::Int32 => f64::from(vr.read_int32()?),
        BsonType::Int64 => vr.read_int64()? as f64,
        BsonType::Boolean => {
            if vr.read_boolean()? {
                1.0
            } else {
                0.0
            }
        }
        BsonType::Null => {
            vr.read_null()?;
            0.0
        }
        BsonType::Undefined => {
            vr.read_undefined()?;
            0.0
        }
        other => return Err(CodecError::unsupported(other, target)),
    })
}

impl ValueCodec for PrimitiveCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        match value {
            FieldValue::Bool(b) => vw.write_boolean(*b)?,
            FieldValue::Int32(v) => vw.write_int32(*v)?,
            FieldValue::Int64(v) => match i32::try_from(*v) {
                Ok(small) if ctx.min_size => vw.write_int32(small)?,
                _ => vw.write_int64(*v)?,
            },
            FieldValue::UInt32(v) => write_unsigned(ctx, vw, u64::from(*v))?,
            FieldValue::UInt64(v) => write_unsigned(ctx, vw, *v)?,
            FieldValue::Float(v) => vw.write_double(f64::from(*v))?,
            FieldValue::Double(v) => vw.write_double(*v)?,
            FieldValue::String(s) => vw.write_string(s)?,
            FieldValue::Bytes(b) => vw.write_binary(b)?,
            other => {
                return Err(CodecError::encoder(
                    "PrimitiveCodec.EncodeValue",
                    other.type_key(),
                    other,
                ))
            }
        }
        Ok(())
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let target = value.type_key();
        match value {
            FieldValue::Bool(slot) => {
                *slot = match vr.bson_type() {
                    BsonType::Boolean => vr.read_boolean()?,
                    BsonType::Int32 => vr.read_int32()? != 0,
                    BsonType::Int64 => vr.read_int64()? != 0,
                    BsonType::Double => vr.read_double()? != 0.0,
                    BsonType::Null => {
                        vr.read_null()?;
                        false
                    }
                    BsonType::Undefined => {
                        vr.read_undefined()?;
                        false
                    }
                    other => return Err(CodecError::unsupported(other, target)),
                }
            }
            FieldValue::Int32(slot) => {
                let v = read_integer(ctx, vr, target)?;
                *slot = i32::try_from(v).map_err(|_| overflow(v, "int32"))?;
            }
            FieldValue::Int64(slot) => *slot = read_integer(ctx, vr, target)?,
            FieldValue::UInt32(slot) => {
                let v = read_integer(ctx, vr, target)?;
                *slot = u32::try_from(v).map_err(|_| overflow(v, "uint32"))?;
            }
            FieldValue::UInt64(slot) => {
                let v = read_integer(ctx, vr, target)?;
                *slot = u64::try_from(v).map_err(|_| overflow(v, "uint64"))?;
            }
            FieldValue::Float(slot) => {
                let f = read_float(vr, target)?;
                let narrowed = f as f32;
                if !ctx.truncate && f64::from(narrowed) != f {
                    return Err(CodecError::Truncation {
                        value: f,
                        target: "float",
                    });
                }
                *slot = narrowed;
            }
            FieldValue::Double(slot) => *slot = read_float(vr, target)?,
            FieldValue::String(slot) => {
                *slot = match vr.bson_type() {
                    BsonType::String => vr.read_string()?,
                    BsonType::Null => {
                        vr.read_null()?;
                        String::new()
                    }
                    BsonType::Undefined => {
                        vr.read_undefined()?;
                        String::new()
                    }
                    other => return Err(CodecError::unsupported(other, target)),
                }
            }
            FieldValue::Bytes(slot) => {
                *slot = match vr.bson_type() {
                    BsonType::Binary => vr.read_binary()?.0,
                    BsonType::String => vr.read_string()?.into_bytes(),
                    BsonType::Null => {
                        vr.read_null()?;
                        Vec::new()
                    }
                    BsonType::Undefined => {
                        vr.read_undefined()?;
                        Vec::new()
                    }
                    other => return Err(CodecError::unsupported(other, target)),
                }
            }
            other => {
                return Err(CodecError::decoder(
                    "PrimitiveCodec.DecodeValue",
                    other.type_key(),
                    other,
                ))
            }
        }
        Ok(())
    }
}

//! Pull-style single-value reader.

use crate::error::BsonError;
use crate::types::BsonType;
use crate::values::{BsonTimestamp, BsonValue, Document};

/// Reads one BSON value. Callers inspect [`ValueReader::bson_type`] and then
/// call the matching typed read; a read that does not match the current type
/// fails with [`BsonError::TypeMismatch`].
pub trait ValueReader {
    /// Type of the value under the cursor.
    fn bson_type(&self) -> BsonType;

    fn read_double(&mut self) -> Result<f64, BsonError>;
    fn read_string(&mut self) -> Result<String, BsonError>;
    fn read_document(&mut self) -> Result<Document, BsonError>;
    fn read_array(&mut self) -> Result<Vec<BsonValue>, BsonError>;
    /// Returns the payload and its binary subtype.
    fn read_binary(&mut self) -> Result<(Vec<u8>, u8), BsonError>;
    fn read_undefined(&mut self) -> Result<(), BsonError>;
    fn read_boolean(&mut self) -> Result<bool, BsonError>;
    /// Milliseconds since the Unix epoch.
    fn read_datetime(&mut self) -> Result<i64, BsonError>;
    fn read_null(&mut self) -> Result<(), BsonError>;
    fn read_int32(&mut self) -> Result<i32, BsonError>;
    fn read_timestamp(&mut self) -> Result<BsonTimestamp, BsonError>;
    fn read_int64(&mut self) -> Result<i64, BsonError>;
    /// Consumes the value whatever its type.
    fn skip(&mut self) -> Result<(), BsonError>;
}

/// A [`ValueReader`] over one borrowed [`BsonValue`]. The value can be read
/// once; further reads fail with [`BsonError::Exhausted`].
#[derive(Debug)]
pub struct BsonValueReader<'a> {
    value: &'a BsonValue,
    consumed: bool,
}

impl<'a> BsonValueReader<'a> {
    pub fn new(value: &'a BsonValue) -> Self {
        Self {
            value,
            consumed: false,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn next(&mut self, expected: BsonType) -> Result<&'a BsonValue, BsonError> {
        if self.consumed {
            return Err(BsonError::Exhausted);
        }
        let actual = self.value.bson_type();
        if actual != expected {
            return Err(BsonError::TypeMismatch { expected, actual });
        }
        self.consumed = true;
        Ok(self.value)
    }
}

macro_rules! read_as {
    ($self:ident, $typ:ident, $pat:pat => $out:expr) => {
        match $self.next(BsonType::$typ)? {
            $pat => Ok($out),
            other => Err(BsonError::TypeMismatch {
                expected: BsonType::$typ,
                actual: other.bson_type(),
            }),
        }
    };
}

impl ValueReader for BsonValueReader<'_> {
    fn bson_type(&self) -> BsonType {
        self.value.bson_type()
    }

    fn read_double(&mut self) -> Result<f64, BsonError> {
        read_as!(self, Double, BsonValue::Double(f) => *f)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        read_as!(self, String, BsonValue::String(s) => s.clone())
    }

    fn read_document(&mut self) -> Result<Document, BsonError> {
        read_as!(self, EmbeddedDocument, BsonValue::Document(doc) => doc.clone())
    }

    fn read_array(&mut self) -> Result<Vec<BsonValue>, BsonError> {
        read_as!(self, Array, BsonValue::Array(values) => values.clone())
    }

    fn read_binary(&mut self) -> Result<(Vec<u8>, u8), BsonError> {
        read_as!(self, Binary, BsonValue::Binary(bin) => (bin.data.clone(), bin.subtype))
    }

    fn read_undefined(&mut self) -> Result<(), BsonError> {
        read_as!(self, Undefined, BsonValue::Undefined => ())
    }

    fn read_boolean(&mut self) -> Result<bool, BsonError> {
        read_as!(self, Boolean, BsonValue::Boolean(b) => *b)
    }

    fn read_datetime(&mut self) -> Result<i64, BsonError> {
        read_as!(self, DateTime, BsonValue::DateTime(ms) => *ms)
    }

    fn read_null(&mut self) -> Result<(), BsonError> {
        read_as!(self, Null, BsonValue::Null => ())
    }

    fn read_int32(&mut self) -> Result<i32, BsonError> {
        read_as!(self, Int32, BsonValue::Int32(i) => *i)
    }

    fn read_timestamp(&mut self) -> Result<BsonTimestamp, BsonError> {
        read_as!(self, Timestamp, BsonValue::Timestamp(ts) => *ts)
    }

    fn read_int64(&mut self) -> Result<i64, BsonError> {
        read_as!(self, Int64, BsonValue::Int64(i) => *i)
    }

    fn skip(&mut self) -> Result<(), BsonError> {
        if self.consumed {
            return Err(BsonError::Exhausted);
        }
        self.consumed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_matching_type_once() {
        let value = BsonValue::Int64(42);
        let mut vr = BsonValueReader::new(&value);
        assert_eq!(vr.bson_type(), BsonType::Int64);
        assert_eq!(vr.read_int64(), Ok(42));
        assert_eq!(vr.read_int64(), Err(BsonError::Exhausted));
        assert!(vr.is_consumed());
    }

    #[test]
    fn mismatched_read_does_not_consume() {
        let value = BsonValue::String("x".into());
        let mut vr = BsonValueReader::new(&value);
        assert_eq!(
            vr.read_int32(),
            Err(BsonError::TypeMismatch {
                expected: BsonType::Int32,
                actual: BsonType::String,
            })
        );
        assert_eq!(vr.read_string(), Ok("x".to_string()));
    }
}

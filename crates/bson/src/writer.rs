//! Push-style single-value writer.

use crate::error::BsonError;
use crate::values::{BsonBinary, BsonTimestamp, BsonValue, Document, BINARY_SUBTYPE_GENERIC};

/// Writes one BSON value. Mirrors [`crate::ValueReader`].
pub trait ValueWriter {
    fn write_double(&mut self, value: f64) -> Result<(), BsonError>;
    fn write_string(&mut self, value: &str) -> Result<(), BsonError>;
    fn write_document(&mut self, document: Document) -> Result<(), BsonError>;
    fn write_array(&mut self, values: Vec<BsonValue>) -> Result<(), BsonError>;
    fn write_binary_with_subtype(&mut self, data: &[u8], subtype: u8) -> Result<(), BsonError>;
    fn write_undefined(&mut self) -> Result<(), BsonError>;
    fn write_boolean(&mut self, value: bool) -> Result<(), BsonError>;
    /// Milliseconds since the Unix epoch.
    fn write_datetime(&mut self, millis: i64) -> Result<(), BsonError>;
    fn write_null(&mut self) -> Result<(), BsonError>;
    fn write_int32(&mut self, value: i32) -> Result<(), BsonError>;
    fn write_timestamp(&mut self, time: u32, increment: u32) -> Result<(), BsonError>;
    fn write_int64(&mut self, value: i64) -> Result<(), BsonError>;

    fn write_binary(&mut self, data: &[u8]) -> Result<(), BsonError> {
        self.write_binary_with_subtype(data, BINARY_SUBTYPE_GENERIC)
    }
}

/// A [`ValueWriter`] that captures the single value written to it.
#[derive(Debug, Default)]
pub struct BsonValueWriter {
    value: Option<BsonValue>,
}

impl BsonValueWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured value, if any.
    pub fn value(&self) -> Option<&BsonValue> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Result<BsonValue, BsonError> {
        self.value.ok_or(BsonError::NothingWritten)
    }

    fn put(&mut self, value: BsonValue) -> Result<(), BsonError> {
        if self.value.is_some() {
            return Err(BsonError::AlreadyWritten);
        }
        self.value = Some(value);
        Ok(())
    }
}

impl ValueWriter for BsonValueWriter {
    fn write_double(&mut self, value: f64) -> Result<(), BsonError> {
        self.put(BsonValue::Double(value))
    }

    fn write_string(&mut self, value: &str) -> Result<(), BsonError> {
        self.put(BsonValue::String(value.to_owned()))
    }

    fn write_document(&mut self, document: Document) -> Result<(), BsonError> {
        self.put(BsonValue::Document(document))
    }

    fn write_array(&mut self, values: Vec<BsonValue>) -> Result<(), BsonError> {
        self.put(BsonValue::Array(values))
    }

    fn write_binary_with_subtype(&mut self, data: &[u8], subtype: u8) -> Result<(), BsonError> {
        self.put(BsonValue::Binary(BsonBinary {
            subtype,
            data: data.to_vec(),
        }))
    }

    fn write_undefined(&mut self) -> Result<(), BsonError> {
        self.put(BsonValue::Undefined)
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), BsonError> {
        self.put(BsonValue::Boolean(value))
    }

    fn write_datetime(&mut self, millis: i64) -> Result<(), BsonError> {
        self.put(BsonValue::DateTime(millis))
    }

    fn write_null(&mut self) -> Result<(), BsonError> {
        self.put(BsonValue::Null)
    }

    fn write_int32(&mut self, value: i32) -> Result<(), BsonError> {
        self.put(BsonValue::Int32(value))
    }

    fn write_timestamp(&mut self, time: u32, increment: u32) -> Result<(), BsonError> {
        self.put(BsonValue::Timestamp(BsonTimestamp { time, increment }))
    }

    fn write_int64(&mut self, value: i64) -> Result<(), BsonError> {
        self.put(BsonValue::Int64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_one_value() {
        let mut vw = BsonValueWriter::new();
        vw.write_binary(b"abc").unwrap();
        assert_eq!(vw.value(), Some(&BsonValue::binary(b"abc".to_vec())));
        assert_eq!(vw.write_null(), Err(BsonError::AlreadyWritten));
    }

    #[test]
    fn empty_writer_has_no_value() {
        assert_eq!(
            BsonValueWriter::new().into_value(),
            Err(BsonError::NothingWritten)
        );
    }
}

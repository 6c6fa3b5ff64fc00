//! BSON document decoder.
//!
//! BSON is a little-endian binary format.

use crate::error::BsonError;
use crate::types::BsonType;
use crate::values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonJavascriptCodeWithScope, BsonObjectId,
    BsonTimestamp, BsonValue, Document,
};

/// BSON document decoder over a borrowed byte buffer.
#[derive(Debug)]
pub struct BsonDecoder<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> BsonDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Decodes the top-level document, returning an error on malformed input.
    pub fn decode(&mut self) -> Result<Document, BsonError> {
        self.x = 0;
        self.read_document()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BsonError> {
        let end = self.x.checked_add(n).ok_or(BsonError::UnexpectedEof)?;
        let slice = self.data.get(self.x..end).ok_or(BsonError::UnexpectedEof)?;
        self.x = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BsonError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, BsonError> {
        Ok(self.take(1)?[0])
    }

    fn i32_le(&mut self) -> Result<i32, BsonError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn u32_le(&mut self) -> Result<u32, BsonError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i64_le(&mut self) -> Result<i64, BsonError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn f64_le(&mut self) -> Result<f64, BsonError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn length(&mut self) -> Result<usize, BsonError> {
        let len = self.i32_le()?;
        usize::try_from(len).map_err(|_| BsonError::InvalidLength(len))
    }

    fn read_document(&mut self) -> Result<Document, BsonError> {
        let start = self.x;
        let size = self.length()?;
        if size < 5 {
            return Err(BsonError::InvalidLength(size as i32));
        }
        let end = start.checked_add(size).ok_or(BsonError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(BsonError::UnexpectedEof);
        }
        let mut fields = Document::new();
        loop {
            let tag = self.u8()?;
            if tag == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_element_value(tag)?;
            fields.push((key, value));
            if self.x >= end {
                return Err(BsonError::UnexpectedEof);
            }
        }
        if self.x != end {
            return Err(BsonError::InvalidLength(size as i32));
        }
        Ok(fields)
    }

    fn read_cstring(&mut self) -> Result<String, BsonError> {
        let rest = &self.data[self.x..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(BsonError::UnexpectedEof)?;
        let bytes = self.take(len)?;
        self.x += 1; // null terminator
        String::from_utf8(bytes.to_vec()).map_err(|_| BsonError::InvalidUtf8)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        let len = self.length()?;
        if len == 0 {
            return Err(BsonError::InvalidLength(0));
        }
        let bytes = self.take(len - 1)?;
        if self.u8()? != 0 {
            return Err(BsonError::InvalidLength(len as i32));
        }
        String::from_utf8(bytes.to_vec()).map_err(|_| BsonError::InvalidUtf8)
    }

    fn read_element_value(&mut self, tag: u8) -> Result<BsonValue, BsonError> {
        let typ = BsonType::from_u8(tag).ok_or(BsonError::UnsupportedType(tag))?;
        Ok(match typ {
            BsonType::Double => BsonValue::Double(self.f64_le()?),
            BsonType::String => BsonValue::String(self.read_string()?),
            BsonType::EmbeddedDocument => BsonValue::Document(self.read_document()?),
            BsonType::Array => BsonValue::Array(self.read_array()?),
            BsonType::Binary => {
                let len = self.length()?;
                let subtype = self.u8()?;
                let data = self.take(len)?.to_vec();
                BsonValue::Binary(BsonBinary { subtype, data })
            }
            BsonType::Undefined => BsonValue::Undefined,
            BsonType::ObjectId => BsonValue::ObjectId(self.read_object_id()?),
            BsonType::Boolean => BsonValue::Boolean(self.u8()? != 0),
            BsonType::DateTime => BsonValue::DateTime(self.i64_le()?),
            BsonType::Null => BsonValue::Null,
            BsonType::Regex => BsonValue::Regex {
                pattern: self.read_cstring()?,
                options: self.read_cstring()?,
            },
            BsonType::DbPointer => BsonValue::DbPointer(BsonDbPointer {
                name: self.read_string()?,
                id: self.read_object_id()?,
            }),
            BsonType::JavaScript => BsonValue::JavaScriptCode(self.read_string()?),
            BsonType::Symbol => BsonValue::Symbol(self.read_string()?),
            BsonType::CodeWithScope => {
                let _total_len = self.i32_le()?;
                BsonValue::JavaScriptCodeWithScope(BsonJavascriptCodeWithScope {
                    code: self.read_string()?,
                    scope: self.read_document()?,
                })
            }
            BsonType::Int32 => BsonValue::Int32(self.i32_le()?),
            BsonType::Timestamp => {
                let increment = self.u32_le()?;
                let time = self.u32_le()?;
                BsonValue::Timestamp(BsonTimestamp { time, increment })
            }
            BsonType::Int64 => BsonValue::Int64(self.i64_le()?),
            BsonType::Decimal128 => BsonValue::Decimal128(BsonDecimal128 {
                data: self.array()?,
            }),
            BsonType::MinKey => BsonValue::MinKey,
            BsonType::MaxKey => BsonValue::MaxKey,
        })
    }

    /// Arrays are documents keyed "0", "1", ...; keys are trusted to be in order.
    fn read_array(&mut self) -> Result<Vec<BsonValue>, BsonError> {
        Ok(self
            .read_document()?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    fn read_object_id(&mut self) -> Result<BsonObjectId, BsonError> {
        let bytes: [u8; 12] = self.array()?;
        let timestamp = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let lo32 = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as u64;
        let process = lo32 | ((bytes[8] as u64) << 32);
        let counter = u32::from_be_bytes([0, bytes[9], bytes[10], bytes[11]]);
        Ok(BsonObjectId {
            timestamp,
            process,
            counter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_truncated_input() {
        assert_eq!(
            BsonDecoder::new(&[12, 0, 0, 0, 0x10]).decode(),
            Err(BsonError::UnexpectedEof)
        );
    }

    #[test]
    fn rejects_unknown_tag() {
        let bytes = [8, 0, 0, 0, 0x42, b'a', 0, 0];
        assert_eq!(
            BsonDecoder::new(&bytes).decode(),
            Err(BsonError::UnsupportedType(0x42))
        );
    }

    #[test]
    fn reads_int32_element() {
        let bytes = [12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0];
        assert_eq!(
            BsonDecoder::new(&bytes).decode(),
            Ok(vec![("a".to_string(), BsonValue::Int32(1))])
        );
    }
}
